//! Executes an `HttpRequest` against the network.
//!
//! # Design
//! `Transport` is the only place the client does network I/O. The default
//! implementation wraps a blocking `ureq::Agent` configured so that 4xx/5xx
//! responses come back as data. Status interpretation stays with the client.
//! Any `Fn(&HttpRequest) -> Result<HttpResponse, TransportError>` is also a
//! transport, which is how tests stub the network.

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

/// Performs one blocking HTTP round-trip.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError>,
{
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}

/// `Transport` backed by `ureq`. Redirects, TLS and connection reuse are
/// ureq's defaults; there is no timeout unless the agent sets one.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Use a caller-configured agent. It should have
    /// `http_status_as_error(false)` so error statuses reach the client.
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = ureq::http::Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = match &request.body {
            Some(body) => self.agent.run(builder.body(body.as_str())?)?,
            None => self.agent.run(builder.body(())?)?,
        };

        let status = response.status().as_u16();
        let headers = header_pairs(response.headers());
        let body = response.body_mut().read_to_string()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Header values that are not visible ASCII are decoded lossily.
fn header_pairs(headers: &ureq::http::HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            (name.as_str().to_string(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    #[test]
    fn closures_are_transports() {
        let transport = |req: &HttpRequest| {
            Ok::<_, TransportError>(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: format!("\"{}\"", req.url),
            })
        };
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: "http://localhost/x".to_string(),
            headers: Vec::new(),
            body: None,
        };
        let response = transport.execute(&request).unwrap();
        assert_eq!(response.body, "\"http://localhost/x\"");
    }

    #[test]
    fn non_ascii_header_values_survive() {
        use ureq::http::{HeaderMap, HeaderValue};

        let mut headers = HeaderMap::new();
        headers.insert("x-greeting", HeaderValue::from_bytes("grüße".as_bytes()).unwrap());
        headers.insert("x-raw", HeaderValue::from_bytes(b"a\xffb").unwrap());
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let mut pairs = header_pairs(&headers);
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("content-type".to_string(), "application/json".to_string()),
                ("x-greeting".to_string(), "grüße".to_string()),
                ("x-raw".to_string(), "a\u{FFFD}b".to_string()),
            ]
        );
    }

    #[test]
    fn ureq_rejects_relative_url() {
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: "/items".to_string(),
            headers: Vec::new(),
            body: None,
        };
        assert!(UreqTransport::new().execute(&request).is_err());
    }
}
