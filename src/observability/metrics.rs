//! Metrics collection and exposition.
//!
//! # Metrics
//! - `image_proxy_requests_total` (counter): requests by status, outcome
//! - `image_proxy_request_duration_seconds` (histogram): handler latency
//! - `image_proxy_upstream_bytes_total` (counter): bytes relayed from origins

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished proxy request.
pub fn record_request(status: u16, outcome: &'static str, start: Instant) {
    counter!(
        "image_proxy_requests_total",
        "status" => status.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("image_proxy_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record the size of a relayed body.
pub fn record_upstream_bytes(bytes: usize) {
    counter!("image_proxy_upstream_bytes_total").increment(bytes as u64);
}
