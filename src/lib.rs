//! URL relay service library.
//!
//! Forwards `?url=<target>` to the target server and relays the answer
//! with CORS opened to every origin.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
