//! Inbound request handling.
//!
//! # Responsibilities
//! - Generate a request ID (UUID v4) when the caller sent none
//! - Pull the relay target out of the query string
//!
//! # Design Decisions
//! - Query parsing never fails: a malformed query simply has no target
//! - The first `url` pair wins when the parameter repeats

use axum::http::{HeaderName, Request, Uri};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Query parameter naming the upstream URL.
pub const TARGET_PARAM: &str = "url";

/// Issues a fresh UUID v4 for every request lacking an ID.
#[derive(Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        id.parse().ok().map(RequestId::new)
    }
}

/// Percent-decoded value of the first `url` query pair, if any.
pub fn target_url(uri: &Uri) -> Option<String> {
    let query = uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == TARGET_PARAM)
        .map(|(_, value)| value.into_owned())
}

/// ID assigned to this request, or `"unknown"` outside the request ID layer.
pub fn request_id<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}
