//! The forwarding handler.
//!
//! # Flow
//! ```text
//! target? ──no──▶ 400
//!    │
//!    ▼
//! client.fetch(url) ──err──▶ 500 (logged)
//!    │
//!    ▼
//! status 2xx? ──no──▶ upstream status + synthesized text
//!    │
//!    ▼
//! relay_headers → JSON or text body → 200
//! ```

use axum::{
    body::Body,
    http::{header, HeaderValue, Response, StatusCode},
};
use url::Url;

use crate::relay::client::{UpstreamClient, UpstreamResponse};
use crate::relay::error::RelayError;
use crate::relay::headers::{self, DEFAULT_CONTENT_TYPE};

/// Fetch `target` through `client` and build the caller's response.
///
/// Errors are returned rather than rendered so the host adapter can log and
/// count them before converting.
pub async fn forward<C>(client: &C, target: Option<&str>) -> Result<Response<Body>, RelayError>
where
    C: UpstreamClient,
{
    let target = match target {
        Some(t) if !t.is_empty() => t,
        _ => return Err(RelayError::MissingUrl),
    };

    let url = Url::parse(target)
        .map_err(|e| RelayError::Transport(format!("invalid URL '{}': {}", target, e)))?;

    tracing::debug!(url = %url, "Fetching upstream");
    let upstream = client.fetch(url).await?;

    if !upstream.status.is_success() {
        return Err(RelayError::upstream_status(upstream.status));
    }

    relay_success(upstream).await
}

async fn relay_success(upstream: UpstreamResponse) -> Result<Response<Body>, RelayError> {
    let mut relayed = headers::relay_headers(&upstream.headers);
    let is_json = headers::is_json(headers::content_type(&relayed));
    if !relayed.contains_key(header::CONTENT_TYPE) {
        relayed.insert(header::CONTENT_TYPE, HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    }

    let raw = upstream.bytes().await?;
    let body = if is_json {
        let value: serde_json::Value = serde_json::from_slice(strip_bom(&raw))?;
        Body::from(serde_json::to_vec(&value)?)
    } else {
        Body::from(String::from_utf8_lossy(&raw).into_owned())
    };

    let mut response = Response::new(body);
    *response.status_mut() = StatusCode::OK;
    *response.headers_mut() = relayed;
    Ok(response)
}

/// Drop a leading UTF-8 byte order mark, which JSON parsers reject.
fn strip_bom(raw: &[u8]) -> &[u8] {
    raw.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(raw)
}
