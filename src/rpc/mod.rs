//! Binary-RPC seam.
//!
//! The core starts, wires and stops the RPC service but stays ignorant
//! of its wire schema: everything behind [`RpcService::serve`] is opaque.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::TcpListener;

pub mod api_v2;

pub use api_v2::ApiV2Service;

/// The binary-RPC collaborator served on port P+1.
#[async_trait]
pub trait RpcService: Send + Sync + 'static {
    /// Serve the native RPC protocol on the given listener until it
    /// stops or fails. Runs on its own task; errors are logged by the
    /// lifecycle manager, never propagated to the general listener.
    async fn serve(self: Arc<Self>, listener: TcpListener) -> std::io::Result<()>;
}
