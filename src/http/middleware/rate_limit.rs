//! Rate limiting middleware.
//!
//! Token bucket keyed by client network address. Buckets refill at a
//! fixed rate up to a burst capacity and reset after an idle window.
//! Binary-RPC traffic bypasses this stage entirely.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;

use crate::http::classify::class_of;
use crate::observability::metrics;

/// Sustained refill rate, tokens per second.
pub const RATE_PER_SEC: f64 = 30.0;
/// Burst capacity per client.
pub const BURST: f64 = 60.0;
/// Idle window after which a bucket resets to full capacity.
pub const EXPIRES_IN: Duration = Duration::from_secs(3 * 60);

/// Sweep idle buckets every this many checks.
const SWEEP_INTERVAL: u64 = 4096;

/// A token bucket for one client.
#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_seen: Instant,
}

/// Shared limiter state, safe under concurrent request tasks.
#[derive(Debug)]
pub struct RateLimiterState {
    buckets: DashMap<String, TokenBucket>,
    rate: f64,
    burst: f64,
    expires_in: Duration,
    checks: AtomicU64,
}

impl RateLimiterState {
    pub fn new(rate: f64, burst: f64, expires_in: Duration) -> Self {
        Self {
            buckets: DashMap::new(),
            rate,
            burst,
            expires_in,
            checks: AtomicU64::new(0),
        }
    }

    /// Try to consume one token for `key`. Returns false when exhausted.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        if self.checks.fetch_add(1, Ordering::Relaxed) % SWEEP_INTERVAL == SWEEP_INTERVAL - 1 {
            self.sweep_idle(now);
        }

        let mut entry = self
            .buckets
            .entry(key.to_string())
            .or_insert_with(|| TokenBucket {
                tokens: self.burst,
                last_seen: now,
            });
        let bucket = entry.value_mut();

        let elapsed = now.saturating_duration_since(bucket.last_seen);
        if elapsed >= self.expires_in {
            bucket.tokens = self.burst;
        } else {
            bucket.tokens = (bucket.tokens + elapsed.as_secs_f64() * self.rate).min(self.burst);
        }
        bucket.last_seen = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Drop buckets that have been idle past the expiry window.
    fn sweep_idle(&self, now: Instant) {
        let expires_in = self.expires_in;
        self.buckets
            .retain(|_, bucket| now.saturating_duration_since(bucket.last_seen) < expires_in);
    }

    /// Number of tracked clients.
    pub fn tracked_clients(&self) -> usize {
        self.buckets.len()
    }
}

impl Default for RateLimiterState {
    fn default() -> Self {
        Self::new(RATE_PER_SEC, BURST, EXPIRES_IN)
    }
}

/// Middleware function for per-client rate limiting.
pub async fn rate_limit_middleware(
    State(state): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if class_of(&request).is_rpc() {
        return next.run(request).await;
    }

    // Identifier extraction failing is an internal limiter fault: fail
    // closed with 403 rather than crash or let the request through.
    let key = match request.extensions().get::<ConnectInfo<SocketAddr>>() {
        Some(ConnectInfo(addr)) => addr.ip().to_string(),
        None => {
            tracing::error!("rate limiter could not identify client");
            metrics::record_rate_limited("identifier_failure");
            return StatusCode::FORBIDDEN.into_response();
        }
    };

    if state.check(&key) {
        next.run(request).await
    } else {
        tracing::warn!(client = %key, "rate limit exceeded");
        metrics::record_rate_limited("quota_exhausted");
        StatusCode::TOO_MANY_REQUESTS.into_response()
    }
}
