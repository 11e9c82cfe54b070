//! Relay error taxonomy.

use axum::http::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Everything that can end a relay attempt early.
///
/// Every variant maps to exactly one caller-facing status code; see
/// [`RelayError::status`].
#[derive(Debug, Error)]
pub enum RelayError {
    /// The `url` query parameter was absent or empty.
    #[error("Error: the \"url\" query parameter is required.")]
    MissingUrl,

    /// The upstream answered with a status outside 200..=299.
    #[error("Failed to fetch URL: {reason}")]
    UpstreamStatus { status: StatusCode, reason: String },

    /// Connection, DNS, TLS or URL failure before headers arrived.
    #[error("Internal proxy error: {0}")]
    Transport(String),

    /// The upstream did not answer within the configured deadline.
    #[error("Internal proxy error: upstream timed out after {0:?}")]
    Timeout(Duration),

    /// The upstream body could not be read to completion.
    #[error("Internal proxy error: {0}")]
    Body(String),

    /// A body declared as JSON did not parse.
    #[error("Internal proxy error: {0}")]
    Decode(String),
}

impl RelayError {
    /// Build an upstream status error, deriving the status text the way
    /// browsers expose `statusText`.
    pub fn upstream_status(status: StatusCode) -> Self {
        let reason = status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| status.as_u16().to_string());
        Self::UpstreamStatus { status, reason }
    }

    /// Status code returned to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MissingUrl => StatusCode::BAD_REQUEST,
            RelayError::UpstreamStatus { status, .. } => *status,
            RelayError::Transport(_)
            | RelayError::Timeout(_)
            | RelayError::Body(_)
            | RelayError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Metrics label for this failure class.
    pub fn outcome(&self) -> &'static str {
        match self {
            RelayError::MissingUrl => "missing_url",
            RelayError::UpstreamStatus { .. } => "upstream_status",
            _ => "transport",
        }
    }

    /// Only transport and decode failures are worth an operator's attention.
    pub fn is_internal(&self) -> bool {
        !matches!(self, RelayError::MissingUrl | RelayError::UpstreamStatus { .. })
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RelayError::Decode(e.to_string())
        } else if e.is_body() {
            RelayError::Body(e.to_string())
        } else {
            RelayError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(e: serde_json::Error) -> Self {
        RelayError::Decode(e.to_string())
    }
}
