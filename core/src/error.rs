//! Error types for the REST client.
//!
//! # Design
//! Every failure the client can recover from is a value, never a panic.
//! `ApiError` is what `send` and `save` return; the caller matches on the
//! variant instead of checking for an absent result. HTTP error statuses get
//! their own `Status` variant, separate from `Transport`, because "the server
//! answered with 404" and "the server could not be reached" call for
//! different handling. `ConfigError` stays separate: the client degrades to an
//! empty configuration instead of surfacing it.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by `ApiClient` dispatch and persistence methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The method string is not an HTTP method the client knows.
    #[error("unsupported HTTP method `{0}`")]
    InvalidMethod(String),

    /// The request body could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The request never produced a response.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: TransportError,
    },

    /// The server answered with a 4xx or 5xx status.
    #[error("request to {url} returned HTTP {status}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// `save` was called without a response.
    #[error("no response to save")]
    NoResponse,

    /// The response body is not valid JSON.
    #[error("response is not valid JSON: {0}")]
    Decode(String),

    /// Creating the output directory or writing the file failed.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// HTTP status code carried by a `Status` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Failures raised by a `Transport` before any response arrives.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The URL, method or a header could not form a valid HTTP request.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] ureq::http::Error),

    /// Connection, DNS, TLS or protocol failure.
    #[error(transparent)]
    Http(#[from] ureq::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors from reading the YAML configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
}
