//! Configuration-driven REST client.
//!
//! # Overview
//! Loads connection settings (base URL, default headers, secrets, output
//! directory) from a YAML file, sends HTTP requests against the configured
//! API, and saves JSON responses to disk.
//!
//! # Design
//! - `ApiClient` is immutable after construction; it holds the resolved base
//!   URL, output directory and `Config`.
//! - Requests are built as plain `HttpRequest` values and executed by a
//!   `Transport` (blocking `ureq` by default), so everything up to the wire
//!   is testable without a network.
//! - Every recoverable failure is logged through `tracing` where it happens
//!   and returned as an `ApiError`; nothing panics on bad input, unreachable
//!   hosts, error statuses or unwritable output directories.
//!
//! ```no_run
//! use std::path::Path;
//! use dynapi_core::{ApiClient, ClientOptions, RequestSpec};
//!
//! let client = ApiClient::new(ClientOptions::default());
//! let result = client.send(&RequestSpec::get("/items/42").query("x", "1"));
//! if let Ok(response) = &result {
//!     client.save(Some(response), Some(Path::new("item.json"))).ok();
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod persist;
pub mod request;
pub mod transport;

pub use client::{ApiClient, ClientOptions};
pub use config::Config;
pub use error::{ApiError, ConfigError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use request::RequestSpec;
pub use transport::{Transport, UreqTransport};
