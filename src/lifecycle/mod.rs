//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (server::new / server::start):
//!     Provision secret → Build pipeline + routes → Start listeners
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Drain general listener → Stop RPC task → Close store
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: secret first, then routes, listeners last
//! - Ordered shutdown: stop accept, drain, release the store
//! - Shutdown has a deadline: stalled connections are force-closed

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
