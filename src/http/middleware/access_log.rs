//! Structured access logging.
//!
//! One log line per request: method, path, status, latency, error.
//! Purely observational; this stage never rejects or delays a request.

use std::time::Instant;

use axum::{body::Body, extract::Request, middleware::Next, response::Response};

use crate::observability::metrics;

pub async fn access_log_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    if status.is_client_error() || status.is_server_error() {
        tracing::info!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            latency_ms,
            error = status.canonical_reason().unwrap_or("unknown"),
            "request"
        );
    } else {
        tracing::info!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            latency_ms,
            "request"
        );
    }
    metrics::record_request(method.as_str(), status.as_u16(), start);

    response
}
