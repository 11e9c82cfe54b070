//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the relay handler on every path and method
//! - Wire up middleware (tracing, request ID, inbound timeout)
//! - Hand each request to the relay with the shared upstream client
//! - Log and count outcomes, render errors as plain text
//! - Serve until shutdown is triggered

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::http::request::{self, MakeRequestUuid, X_REQUEST_ID};
use crate::observability::metrics;
use crate::relay::{self, ReqwestUpstream, UpstreamClient};

/// Application state injected into handlers.
pub struct AppState<C> {
    pub client: Arc<C>,
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
        }
    }
}

/// HTTP server exposing the relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a server that fetches through `reqwest`.
    pub fn new(config: RelayConfig) -> Result<Self, reqwest::Error> {
        let client = ReqwestUpstream::new(&config.upstream)?;
        Ok(Self::with_client(config, client))
    }

    /// Create a server around any upstream client.
    pub fn with_client<C: UpstreamClient>(config: RelayConfig, client: C) -> Self {
        let state = AppState {
            client: Arc::new(client),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router<C: UpstreamClient>(config: &RelayConfig, state: AppState<C>) -> Router {
        let timeout = Duration::from_secs(config.listener.request_timeout_secs);

        Router::new()
            .route("/", any(relay_handler::<C>))
            .route("/{*path}", any(relay_handler::<C>))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                    .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)),
            )
    }

    /// The router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream_timeout_secs = self.config.upstream.timeout_secs,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Relay handler: method and body are ignored, only `?url=` matters.
async fn relay_handler<C: UpstreamClient>(
    State(state): State<AppState<C>>,
    req: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let request_id = request::request_id(&req);
    let target = request::target_url(req.uri());

    match relay::forward(state.client.as_ref(), target.as_deref()).await {
        Ok(response) => {
            metrics::record_request("success", response.status().as_u16(), start_time);
            response
        }
        Err(e) => {
            if e.is_internal() {
                tracing::error!(
                    request_id = %request_id,
                    url = target.as_deref().unwrap_or_default(),
                    error = %e,
                    "Proxy error"
                );
            }
            metrics::record_request(e.outcome(), e.status().as_u16(), start_time);
            e.into_response()
        }
    }
}
