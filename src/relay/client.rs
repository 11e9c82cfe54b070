//! Upstream HTTP client capability.
//!
//! The relay never talks to the network directly; it receives an
//! [`UpstreamClient`] and only sees [`UpstreamResponse`] values. The
//! production implementation is [`ReqwestUpstream`].

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use url::Url;

use crate::config::UpstreamConfig;
use crate::relay::error::RelayError;

type BodyFuture = Pin<Box<dyn Future<Output = Result<Bytes, RelayError>> + Send>>;

/// Response head received from the upstream, with the body still pending.
///
/// Dropping the value without calling [`UpstreamResponse::bytes`] discards
/// the body without reading it.
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    body: BodyFuture,
}

impl UpstreamResponse {
    /// Wrap a response head and a future that yields the full body.
    pub fn new<F>(status: StatusCode, headers: HeaderMap, body: F) -> Self
    where
        F: Future<Output = Result<Bytes, RelayError>> + Send + 'static,
    {
        Self {
            status,
            headers,
            body: Box::pin(body),
        }
    }

    /// Response whose body is already in memory.
    pub fn buffered(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        Self::new(status, headers, async move { Ok(body) })
    }

    /// Wait for the whole body.
    pub async fn bytes(self) -> Result<Bytes, RelayError> {
        self.body.await
    }
}

impl std::fmt::Debug for UpstreamResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Something able to perform a single GET and hand back the response head.
pub trait UpstreamClient: Send + Sync + 'static {
    fn fetch(&self, url: Url) -> impl Future<Output = Result<UpstreamResponse, RelayError>> + Send;
}

/// [`UpstreamClient`] backed by a shared `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestUpstream {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestUpstream {
    /// Build the client from the `[upstream]` config section.
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let redirect = if config.max_redirects == 0 {
            reqwest::redirect::Policy::none()
        } else {
            reqwest::redirect::Policy::limited(config.max_redirects)
        };

        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .redirect(redirect);
        if !config.system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        Ok(Self { client, timeout })
    }

    fn map_error(&self, e: reqwest::Error) -> RelayError {
        if e.is_timeout() {
            RelayError::Timeout(self.timeout)
        } else {
            RelayError::from(e)
        }
    }
}

impl UpstreamClient for ReqwestUpstream {
    async fn fetch(&self, url: Url) -> Result<UpstreamResponse, RelayError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        let headers = response.headers().clone();
        let this = self.clone();
        Ok(UpstreamResponse::new(status, headers, async move {
            response.bytes().await.map_err(|e| this.map_error(e))
        }))
    }
}
