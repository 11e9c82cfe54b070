//! Response rendering.
//!
//! # Responsibilities
//! - Turn every [`RelayError`] into a plain-text response
//! - Keep the caller-facing status in one place ([`RelayError::status`])

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::relay::RelayError;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Plain-text response with `status`.
pub fn plain_text(status: StatusCode, message: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN))],
        message,
    )
        .into_response()
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        plain_text(self.status(), self.to_string())
    }
}
