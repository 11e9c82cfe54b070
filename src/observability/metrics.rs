//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): relayed requests by outcome, status
//! - `relay_request_duration_seconds` (histogram): latency by outcome
//!
//! Recording is a no-op until [`init_metrics`] installs the Prometheus
//! recorder.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

pub const REQUESTS_TOTAL: &str = "relay_requests_total";
pub const REQUEST_DURATION: &str = "relay_request_duration_seconds";

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished relay.
pub fn record_request(outcome: &'static str, status: u16, start: Instant) {
    metrics::counter!(REQUESTS_TOTAL, "outcome" => outcome, "status" => status.to_string())
        .increment(1);
    metrics::histogram!(REQUEST_DURATION, "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}
