//! Metrics collection and exposition.
//!
//! # Metrics
//! - `pinstack_server_starts_total` (counter): start telemetry signal
//! - `pinstack_requests_total` (counter): requests by method, status
//! - `pinstack_request_duration_seconds` (histogram): latency distribution
//! - `pinstack_rate_limited_total` (counter): limiter rejections by reason
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - The Prometheus endpoint is optional; recording without an exporter
//!   installed is a no-op

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on the given address.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "failed to install metrics exporter"),
    }
}

/// Start telemetry signal, emitted once per successful start.
pub fn record_server_start() {
    metrics::counter!("pinstack_server_starts_total").increment(1);
}

/// Record one handled request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let method = method.to_string();
    let status = status.to_string();
    metrics::counter!(
        "pinstack_requests_total",
        "method" => method.clone(),
        "status" => status.clone()
    )
    .increment(1);
    metrics::histogram!(
        "pinstack_request_duration_seconds",
        "method" => method,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a rate limiter rejection.
pub fn record_rate_limited(reason: &'static str) {
    metrics::counter!("pinstack_rate_limited_total", "reason" => reason).increment(1);
}
