//! Middleware pipeline for the general HTTP listener.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → classify (tag as binary-RPC or general, once per request)
//!     → access_log (structured log line, never rejects)
//!     → cors (allow-all policy, RPC exempt)
//!     → timeout (30s budget, RPC exempt)
//!     → rate_limit (per-IP token bucket, RPC exempt)
//!     → Route handler / gateway / frontend fallback
//! ```
//!
//! # Design Decisions
//! - Classification happens exactly once; every skip-able stage reads
//!   the same tag, so stages can never disagree about a request
//! - Rejections surface as plain HTTP statuses, never panics

pub mod access_log;
pub mod cors;
pub mod rate_limit;
pub mod timeout;

pub use access_log::access_log_middleware;
pub use cors::cors_middleware;
pub use rate_limit::{rate_limit_middleware, RateLimiterState};
pub use timeout::timeout_middleware;
