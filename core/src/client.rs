//! Configuration-driven REST client.
//!
//! # Design
//! `ApiClient` holds the resolved base URL, output directory and the loaded
//! `Config`, none of which change after construction. Each call is split the
//! same way: `build_request` is pure, `send` runs it through the `Transport`
//! and validates the status, and `save` decodes and persists. Failures are
//! logged where they happen and returned as `ApiError` values.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{Config, DEFAULT_CONFIG_PATH};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::persist;
use crate::request::{self, RequestSpec};
use crate::transport::{Transport, UreqTransport};

/// Output directory used when the configuration does not name one.
pub const DEFAULT_OUTPUT_DIR: &str = "data_files";

/// Construction parameters for `ApiClient`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Takes precedence over `server.base_url` when non-empty.
    pub base_url: Option<String>,
    pub config_path: PathBuf,
    /// Overridden by `server.output_dir` when the configuration sets it.
    pub output_dir: PathBuf,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: None,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl ClientOptions {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}

/// Synchronous REST client driven by a YAML configuration.
pub struct ApiClient<T = UreqTransport> {
    base_url: String,
    output_dir: PathBuf,
    config: Config,
    transport: T,
}

impl ApiClient<UreqTransport> {
    /// Load `options.config_path` and build a client over `ureq`.
    ///
    /// Never fails: a missing or malformed configuration file leaves the
    /// client with an empty configuration.
    pub fn new(options: ClientOptions) -> Self {
        let config = Config::load_or_default(&options.config_path);
        Self::from_config(config, options)
    }

    /// Build a client from an already-loaded configuration.
    /// `options.config_path` is ignored.
    pub fn from_config(config: Config, options: ClientOptions) -> Self {
        Self::with_transport(config, options, UreqTransport::new())
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(config: Config, options: ClientOptions, transport: T) -> Self {
        let base_url = options
            .base_url
            .filter(|url| !url.is_empty())
            .or_else(|| config.base_url().map(str::to_string))
            .unwrap_or_default();
        let output_dir = config
            .output_dir()
            .map(Path::to_path_buf)
            .unwrap_or(options.output_dir);
        Self {
            base_url,
            output_dir,
            config,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Configured header `key`, or `default` when absent.
    pub fn get_header<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.config.header(key).unwrap_or(default)
    }

    /// Configured secret `key`, or `default` when absent.
    pub fn get_secret<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.config.secret(key).unwrap_or(default)
    }

    /// Resolve URL, query, headers and body for `spec` without any I/O.
    pub fn build_request(&self, spec: &RequestSpec) -> Result<HttpRequest, ApiError> {
        let url = request::append_query(
            &request::resolve_url(&self.base_url, &spec.endpoint),
            &spec.query,
        );
        let mut headers = request::merge_headers(&self.config.headers, &spec.headers);
        let body = match &spec.body {
            Some(value) => {
                let body = serde_json::to_string(value)
                    .map_err(|e| ApiError::Serialization(e.to_string()))?;
                if !headers.iter().any(|(k, _)| k.eq_ignore_ascii_case("content-type")) {
                    headers.push(("content-type".to_string(), "application/json".to_string()));
                }
                Some(body)
            }
            None => None,
        };
        Ok(HttpRequest {
            method: spec.method,
            url,
            headers,
            body,
        })
    }

    /// Send `spec` and return the raw response.
    ///
    /// Transport failures and 4xx/5xx statuses are logged with the target URL
    /// and returned as `ApiError::Transport` / `ApiError::Status`.
    pub fn send(&self, spec: &RequestSpec) -> Result<HttpResponse, ApiError> {
        let request = self.build_request(spec)?;
        debug!(method = %request.method, url = %request.url, "sending request");

        let response = match self.transport.execute(&request) {
            Ok(response) => response,
            Err(source) => {
                warn!(url = %request.url, error = %source, "error during request");
                return Err(ApiError::Transport {
                    url: request.url,
                    source,
                });
            }
        };

        check_status(&request.url, response)
    }

    /// String-typed form of `send`. `method` is case-insensitive.
    pub fn request(
        &self,
        method: &str,
        endpoint: &str,
        query: Option<&[(String, String)]>,
        body: Option<Value>,
        headers: Option<&[(String, String)]>,
    ) -> Result<HttpResponse, ApiError> {
        let method: HttpMethod = method.parse().inspect_err(|e| {
            warn!(error = %e, "error building request");
        })?;
        let spec = RequestSpec {
            method,
            endpoint: endpoint.to_string(),
            query: query.map(<[_]>::to_vec).unwrap_or_default(),
            body,
            headers: headers.map(<[_]>::to_vec).unwrap_or_default(),
        };
        self.send(&spec)
    }

    /// Where `save` would write for `filename`.
    pub fn output_path(&self, filename: Option<&Path>) -> PathBuf {
        persist::resolve_output_path(&self.output_dir, filename)
    }

    /// Decode `response` as JSON and write it to disk.
    ///
    /// A bare `filename` lands in the output directory; `None` picks a
    /// timestamped name. Nothing is written when there is no response or the
    /// body is not JSON.
    pub fn save(
        &self,
        response: Option<&HttpResponse>,
        filename: Option<&Path>,
    ) -> Result<PathBuf, ApiError> {
        let Some(response) = response else {
            warn!("nothing to save");
            return Err(ApiError::NoResponse);
        };

        let value = persist::decode_json(response).inspect_err(|e| {
            warn!(error = %e, "response is not in JSON format");
        })?;

        let path = self.output_path(filename);
        if let Err(source) = persist::write_json(&path, &value) {
            warn!(path = %path.display(), error = %source, "failed to save response");
            return Err(ApiError::Io { path, source });
        }

        info!(path = %path.display(), "data saved");
        Ok(path)
    }
}

/// Map 4xx/5xx statuses to `ApiError::Status`; everything else is a success.
fn check_status(url: &str, response: HttpResponse) -> Result<HttpResponse, ApiError> {
    if !response.is_error() {
        return Ok(response);
    }
    warn!(url, status = response.status, "error during request");
    Err(ApiError::Status {
        url: url.to_string(),
        status: response.status,
        body: response.body,
    })
}
