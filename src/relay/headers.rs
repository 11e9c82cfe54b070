//! Header normalization for relayed responses.

use axum::http::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_ENCODING, CONTENT_LENGTH,
    CONTENT_TYPE,
};

/// Content type assumed when the upstream declares none.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Copy upstream headers for the caller.
///
/// `Content-Encoding` and `Content-Length` describe the upstream framing,
/// not the re-serialized body, so they are dropped. CORS is opened to any
/// origin, replacing whatever the upstream sent.
pub fn relay_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = upstream.clone();
    headers.remove(CONTENT_ENCODING);
    headers.remove(CONTENT_LENGTH);
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers
}

/// Declared content type, or [`DEFAULT_CONTENT_TYPE`].
pub fn content_type(headers: &HeaderMap) -> &str {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}

/// Whether the body should be relayed as JSON.
pub fn is_json(content_type: &str) -> bool {
    content_type.contains("application/json")
}
