//! URL relay subsystem.
//!
//! # Data Flow
//! ```text
//! ?url=<target>
//!     → forward.rs (validate, fetch, classify)
//!     → client.rs (UpstreamClient: one GET, headers first, body on demand)
//!     → headers.rs (drop framing headers, open CORS)
//!     → forward.rs (JSON re-encode or text passthrough)
//! ```
//!
//! # Design Decisions
//! - The handler receives its HTTP client; nothing is ambient
//! - One upstream call per request, never retried
//! - Successful relays always answer 200
//! - The upstream body is only read on the success path

pub mod client;
pub mod error;
pub mod forward;
pub mod headers;

pub use client::{ReqwestUpstream, UpstreamClient, UpstreamResponse};
pub use error::RelayError;
pub use forward::forward;
