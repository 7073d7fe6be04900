//! Pinstack server core: dual-protocol bootstrap and lifecycle manager.

pub mod api;
pub mod config;
pub mod http;
pub mod license;
pub mod lifecycle;
pub mod observability;
pub mod rpc;
pub mod server;
pub mod store;

pub use config::{Mode, Profile};
pub use lifecycle::Shutdown;
pub use server::{Server, ServerError};
pub use store::{FileStore, MemoryStore, SettingStore};
