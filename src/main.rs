//! Pinstack server binary.
//!
//! Wires the production collaborators together: a file-backed setting
//! store, the API v2 service on the adjacent port, and the lifecycle
//! manager serving the general HTTP surface.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use pinstack::config::{Mode, Profile};
use pinstack::lifecycle::{signals, Shutdown};
use pinstack::observability;
use pinstack::rpc::ApiV2Service;
use pinstack::server::Server;
use pinstack::store::{FileStore, SettingStore};

#[derive(Debug, Parser)]
#[command(name = "pinstack", version, about = "Self-hosted bookmark server")]
struct Args {
    /// Deployment mode.
    #[arg(long, value_enum, default_value = "dev")]
    mode: Mode,

    /// Port of the general HTTP listener; the RPC listener uses port+1.
    #[arg(long, default_value_t = 5231)]
    port: u16,

    /// Data directory for persisted workspace settings.
    #[arg(long, default_value = "data")]
    data: PathBuf,

    /// Directory of built frontend assets to serve.
    #[arg(long)]
    dist: Option<PathBuf>,

    /// Optional bind address for the Prometheus metrics exporter.
    #[arg(long)]
    metrics_addr: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    observability::logging::init();
    if let Some(addr) = args.metrics_addr {
        observability::metrics::init_metrics(addr);
    }

    let profile = Profile {
        mode: args.mode,
        port: args.port,
        data: args.data,
        dist: args.dist,
    };
    tracing::info!(
        mode = ?profile.mode,
        port = profile.port,
        rpc_port = profile.rpc_port(),
        data = %profile.data.display(),
        "configuration loaded"
    );

    std::fs::create_dir_all(&profile.data)?;
    let store: Arc<dyn SettingStore> =
        Arc::new(FileStore::open(profile.data.join("settings.json"))?);
    let rpc = Arc::new(ApiV2Service::new(profile.clone(), store.clone()));

    let server = Server::new(profile, store, rpc).await?;

    let shutdown = Shutdown::new();
    signals::spawn_handlers(&shutdown);

    // Serve until a signal or a fatal listener error; release resources
    // either way before surfacing the result.
    let result = server.start(&shutdown).await;
    server.shutdown().await;
    result?;

    Ok(())
}
