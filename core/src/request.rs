//! Call-site description of a request, and the rules for turning it into an
//! `HttpRequest`.
//!
//! # Design
//! `RequestSpec` carries only what the caller decides per call. The pieces
//! that depend on client state (base URL, configured headers) are combined
//! by the free functions below, which `ApiClient::build_request` chains.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::HttpMethod;

/// One request, as the caller describes it.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub method: HttpMethod,
    /// Absolute `http(s)://` URL, or a path appended to the client's base URL.
    pub endpoint: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Overrides the configured headers on a name collision.
    pub headers: Vec<(String, String)>,
}

impl RequestSpec {
    pub fn new(method: HttpMethod, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            query: Vec::new(),
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, endpoint)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize any `Serialize` value as the JSON body.
    pub fn json<T: Serialize>(self, body: &T) -> Result<Self, ApiError> {
        let value =
            serde_json::to_value(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.body(value))
    }
}

/// True when `endpoint` carries its own `http://` or `https://` scheme.
pub fn is_absolute_url(endpoint: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        endpoint
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// Absolute endpoints are used verbatim; anything else is appended to
/// `base_url` as-is, without adding or removing slashes.
pub fn resolve_url(base_url: &str, endpoint: &str) -> String {
    if is_absolute_url(endpoint) {
        endpoint.to_string()
    } else {
        format!("{base_url}{endpoint}")
    }
}

/// Append form-urlencoded `query` pairs to `url`, ahead of any `#fragment`.
pub fn append_query(url: &str, query: &[(String, String)]) -> String {
    if query.is_empty() {
        return url.to_string();
    }
    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query)
        .finish();
    let (base, fragment) = match url.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (url, None),
    };
    let separator = if base.contains('?') { '&' } else { '?' };
    match fragment {
        Some(fragment) => format!("{base}{separator}{encoded}#{fragment}"),
        None => format!("{base}{separator}{encoded}"),
    }
}

/// Configured headers first, then per-call headers. A per-call header
/// replaces any earlier header with the same name, ignoring ASCII case.
pub fn merge_headers(
    configured: &BTreeMap<String, String>,
    overrides: &[(String, String)],
) -> Vec<(String, String)> {
    let mut merged: Vec<(String, String)> = configured
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    for (name, value) in overrides {
        merged.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
        merged.push((name.clone(), value.clone()));
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn relative_endpoint_is_concatenated() {
        assert_eq!(
            resolve_url("https://api.example.com", "/items/42"),
            "https://api.example.com/items/42"
        );
    }

    #[test]
    fn slashes_are_not_normalized() {
        assert_eq!(resolve_url("http://h/", "/x"), "http://h//x");
        assert_eq!(resolve_url("http://h", "x"), "http://hx");
    }

    #[test]
    fn absolute_endpoint_ignores_base_url() {
        assert_eq!(
            resolve_url("https://api.example.com", "http://other.test/a"),
            "http://other.test/a"
        );
        assert_eq!(resolve_url("", "HTTPS://other.test/"), "HTTPS://other.test/");
    }

    #[test]
    fn scheme_check_requires_separator() {
        assert!(!is_absolute_url("httpbin/get"));
        assert!(!is_absolute_url("/http://nested"));
        assert!(!is_absolute_url("ftp://host/file"));
        assert!(is_absolute_url("https://host"));
    }

    #[test]
    fn empty_base_url_leaves_endpoint_alone() {
        assert_eq!(resolve_url("", "/items"), "/items");
    }

    #[test]
    fn query_is_form_encoded() {
        let url = append_query(
            "http://h/search",
            &pairs(&[("q", "a b&c"), ("page", "2")]),
        );
        assert_eq!(url, "http://h/search?q=a+b%26c&page=2");
    }

    #[test]
    fn query_extends_existing_query_string() {
        let url = append_query("http://h/x?fixed=1", &pairs(&[("x", "1")]));
        assert_eq!(url, "http://h/x?fixed=1&x=1");
    }

    #[test]
    fn query_goes_before_fragment() {
        let url = append_query("http://h/x#f", &pairs(&[("x", "1")]));
        assert_eq!(url, "http://h/x?x=1#f");

        let url = append_query("http://h/x?a=b#sec?tion", &pairs(&[("x", "1")]));
        assert_eq!(url, "http://h/x?a=b&x=1#sec?tion");
    }

    #[test]
    fn empty_query_leaves_url_unchanged() {
        assert_eq!(append_query("http://h/x", &[]), "http://h/x");
    }

    #[test]
    fn repeated_query_keys_are_kept_in_order() {
        let url = append_query("http://h/x", &pairs(&[("tag", "a"), ("tag", "b")]));
        assert_eq!(url, "http://h/x?tag=a&tag=b");
    }

    #[test]
    fn per_call_headers_win() {
        let configured = BTreeMap::from([("A".to_string(), "1".to_string())]);
        let merged = merge_headers(&configured, &pairs(&[("A", "2"), ("B", "3")]));
        assert_eq!(merged, pairs(&[("A", "2"), ("B", "3")]));
    }

    #[test]
    fn header_override_ignores_case() {
        let configured = BTreeMap::from([
            ("Accept".to_string(), "text/plain".to_string()),
            ("User-Agent".to_string(), "dynapi".to_string()),
        ]);
        let merged = merge_headers(&configured, &pairs(&[("accept", "application/json")]));
        assert_eq!(
            merged,
            pairs(&[("User-Agent", "dynapi"), ("accept", "application/json")])
        );
    }

    #[test]
    fn merge_is_idempotent() {
        let configured = BTreeMap::from([("A".to_string(), "1".to_string())]);
        let overrides = pairs(&[("A", "2"), ("B", "3")]);
        let once = merge_headers(&configured, &overrides);
        let twice = merge_headers(&configured, &once);
        assert_eq!(once, twice);
    }

    #[test]
    fn merge_does_not_touch_configured_headers() {
        let configured = BTreeMap::from([("A".to_string(), "1".to_string())]);
        let _ = merge_headers(&configured, &pairs(&[("A", "2")]));
        assert_eq!(configured.get("A").map(String::as_str), Some("1"));
    }

    #[test]
    fn builder_collects_parts() {
        let spec = RequestSpec::post("/items")
            .query("dry_run", "true")
            .header("X-Trace", "abc")
            .body(json!({"name": "widget"}));
        assert_eq!(spec.method, HttpMethod::Post);
        assert_eq!(spec.query, pairs(&[("dry_run", "true")]));
        assert_eq!(spec.headers, pairs(&[("X-Trace", "abc")]));
        assert_eq!(spec.body, Some(json!({"name": "widget"})));
    }

    #[test]
    fn json_body_from_serializable() {
        #[derive(Serialize)]
        struct NewItem<'a> {
            name: &'a str,
            count: u32,
        }
        let spec = RequestSpec::post("/items")
            .json(&NewItem { name: "bolt", count: 3 })
            .unwrap();
        assert_eq!(spec.body, Some(json!({"name": "bolt", "count": 3})));
    }
}
