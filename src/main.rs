//! fetch-relay
//!
//! Relays `GET ?url=<target>` to the target and returns its body with
//! `Access-Control-Allow-Origin: *`.
//!
//! # Architecture Overview
//!
//! ```text
//!   Caller ──?url=…──▶ ┌──────────────┐   GET    ┌──────────────┐
//!                      │ http server  │ ───────▶ │   upstream   │
//!   Caller ◀── 200 ─── │  + relay     │ ◀─────── │    server    │
//!                      └──────────────┘          └──────────────┘
//!                        │ config │ logging │ metrics │ shutdown │
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use fetch_relay::config::{load_config, validate_config, ConfigError, RelayConfig};
use fetch_relay::http::HttpServer;
use fetch_relay::lifecycle::{wait_for_signal, Shutdown};
use fetch_relay::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "fetch-relay", version)]
#[command(about = "Relay a ?url= target and expose it with CORS", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override observability.log_level.
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn resolve_config(&self) -> Result<RelayConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => RelayConfig::default(),
        };
        if let Some(bind) = &self.bind {
            config.listener.bind_address = bind.clone();
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    logging::init_logging(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        upstream_timeout_secs = config.upstream.timeout_secs,
        max_redirects = config.upstream.max_redirects,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Address was checked by validate_config.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
