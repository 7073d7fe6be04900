//! Request classification.
//!
//! A single shared predicate decides whether a request belongs to the
//! binary-RPC surface. The earliest pipeline stage computes the class
//! once and attaches it to the request; every later stage that skips
//! RPC traffic reads that tag instead of re-matching the path.

use axum::{body::Body, extract::Request, middleware::Next, response::Response};

/// Path prefix of the binary-RPC service's fully qualified name.
pub const RPC_PATH_PREFIX: &str = "/pinstack.api.v2.";

/// Per-request protocol classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// Binary-RPC traffic, exempt from CORS, timeout and rate limiting.
    Rpc,
    /// Everything else on the general HTTP surface.
    General,
}

impl RequestClass {
    pub fn is_rpc(self) -> bool {
        self == RequestClass::Rpc
    }
}

/// The classification predicate. Pure, O(prefix) in the path.
pub fn is_rpc_path(path: &str) -> bool {
    path.starts_with(RPC_PATH_PREFIX)
}

/// Earliest pipeline stage: tag the request with its class.
pub async fn classify_middleware(mut request: Request<Body>, next: Next) -> Response {
    let class = if is_rpc_path(request.uri().path()) {
        RequestClass::Rpc
    } else {
        RequestClass::General
    };
    request.extensions_mut().insert(class);
    next.run(request).await
}

/// Read the class tag attached by [`classify_middleware`].
///
/// Requests that somehow bypass the classifier count as general traffic,
/// which means every pipeline stage still applies to them.
pub fn class_of(request: &Request<Body>) -> RequestClass {
    request
        .extensions()
        .get::<RequestClass>()
        .copied()
        .unwrap_or(RequestClass::General)
}
