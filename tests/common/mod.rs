//! Shared utilities for integration testing.

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use pinstack::config::{Mode, Profile};
use pinstack::lifecycle::Shutdown;
use pinstack::rpc::{ApiV2Service, RpcService};
use pinstack::server::{Server, ServerError};
use pinstack::store::{
    MemoryStore, SettingStore, StoreError, WorkspaceSetting, WorkspaceSettingKey,
};

/// Profile bound to localhost test ports.
pub fn test_profile(mode: Mode, port: u16) -> Profile {
    Profile {
        mode,
        port,
        data: std::env::temp_dir(),
        dist: None,
    }
}

/// A started server with its shutdown coordinator and serve task.
pub struct TestServer {
    pub server: Arc<Server>,
    pub store: Arc<MemoryStore>,
    pub shutdown: Shutdown,
    pub serve_task: JoinHandle<Result<(), ServerError>>,
    pub base_url: String,
}

impl TestServer {
    /// Trigger shutdown and wait for the serve loop to stop.
    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = self.serve_task.await;
        self.server.shutdown().await;
    }
}

/// Start a full server (memory store + API v2 collaborator) on `port`.
pub async fn start_server(mode: Mode, port: u16) -> TestServer {
    let store = Arc::new(MemoryStore::new());
    start_server_with_store(mode, port, store).await
}

pub async fn start_server_with_store(
    mode: Mode,
    port: u16,
    store: Arc<MemoryStore>,
) -> TestServer {
    let profile = test_profile(mode, port);
    let rpc = Arc::new(ApiV2Service::new(
        profile.clone(),
        store.clone() as Arc<dyn SettingStore>,
    ));
    let server = Arc::new(
        Server::new(profile, store.clone() as Arc<dyn SettingStore>, rpc)
            .await
            .expect("server construction failed"),
    );

    let shutdown = Shutdown::new();
    let serve_server = server.clone();
    let serve_shutdown = shutdown.clone();
    let serve_task = tokio::spawn(async move { serve_server.start(&serve_shutdown).await });

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer {
        server,
        store,
        shutdown,
        serve_task,
        base_url,
    }
}

/// Poll the liveness endpoint until the listener answers.
pub async fn wait_until_ready(base_url: &str) {
    let client = reqwest::Client::new();
    for _ in 0..50 {
        if let Ok(response) = client.get(format!("{base_url}/healthz")).send().await {
            if response.status().is_success() {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("server did not become ready at {base_url}");
}

/// Poll the RPC listener until it answers on the adjacent port.
pub async fn wait_until_rpc_ready(rpc_port: u16) {
    let client = test_client();
    let url = format!("http://127.0.0.1:{rpc_port}/pinstack.api.v2.WorkspaceService/GetProfile");
    for _ in 0..50 {
        if let Ok(response) = client.post(&url).send().await {
            if response.status().is_success() {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("rpc listener did not become ready on port {rpc_port}");
}

/// Non-pooled client, so every request opens a fresh connection.
pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Store whose close always fails; reads and writes work.
#[derive(Default)]
pub struct CloseFailStore {
    inner: MemoryStore,
    pub close_attempts: std::sync::atomic::AtomicU32,
}

#[async_trait]
impl SettingStore for CloseFailStore {
    async fn get_workspace_setting(
        &self,
        key: WorkspaceSettingKey,
    ) -> Result<Option<WorkspaceSetting>, StoreError> {
        self.inner.get_workspace_setting(key).await
    }

    async fn upsert_workspace_setting(
        &self,
        setting: WorkspaceSetting,
    ) -> Result<WorkspaceSetting, StoreError> {
        self.inner.upsert_workspace_setting(setting).await
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.close_attempts
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Err(StoreError::Closed)
    }
}

/// Store that fails every operation.
pub struct BrokenStore;

#[async_trait]
impl SettingStore for BrokenStore {
    async fn get_workspace_setting(
        &self,
        _key: WorkspaceSettingKey,
    ) -> Result<Option<WorkspaceSetting>, StoreError> {
        Err(StoreError::Closed)
    }

    async fn upsert_workspace_setting(
        &self,
        _setting: WorkspaceSetting,
    ) -> Result<WorkspaceSetting, StoreError> {
        Err(StoreError::Closed)
    }

    async fn close(&self) -> Result<(), StoreError> {
        Err(StoreError::Closed)
    }
}

/// RPC service whose serve returns immediately, leaving nothing bound.
pub struct DeadRpcService;

#[async_trait]
impl RpcService for DeadRpcService {
    async fn serve(self: Arc<Self>, _listener: tokio::net::TcpListener) -> std::io::Result<()> {
        Ok(())
    }
}
