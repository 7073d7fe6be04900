//! HTTP surface of the server.
//!
//! # Data Flow
//! ```text
//! General listener (port P)
//!     → middleware pipeline (classify → log → cors → timeout → rate limit)
//!     → route table (/healthz, /api/v1/...)
//!     → fallback: gateway.rs (RPC-classified) or frontend.rs (assets)
//!
//! Binary-RPC listener (port P+1)
//!     → RPC service directly, untouched by the pipeline
//! ```

pub mod classify;
pub mod frontend;
pub mod gateway;
pub mod middleware;

pub use classify::{is_rpc_path, RequestClass, RPC_PATH_PREFIX};
pub use frontend::FrontendService;
pub use gateway::{GatewayError, RpcGateway};
