//! Server lifecycle manager.
//!
//! # Data Flow
//! ```text
//! new():    provision secret → build pipeline + routes → gateway
//!           (any failure aborts; no partially built server escapes)
//! start():  spawn subscription load (best-effort)
//!           spawn binary-RPC listener (failures logged, never fatal)
//!           run general HTTP listener on the calling task (blocks)
//! shutdown(): drain general listener (10s bound)
//!           → stop RPC listener task
//!           → close the store handle
//!           (each step logged on failure, none short-circuits the rest)
//! ```
//!
//! # Design Decisions
//! - Construction is strictly sequential: routes need the secret, the
//!   fallback needs the gateway, the listeners come last
//! - The two listeners never assume anything about each other once
//!   running
//! - The store is closed exactly once, after the general listener has
//!   stopped accepting work

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Request, State},
    middleware,
    response::Response,
    routing::get,
    Router,
};
use axum_server::Handle;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::api::ApiV1Service;
use crate::config::Profile;
use crate::http::classify::{class_of, classify_middleware};
use crate::http::middleware::{
    access_log_middleware, cors_middleware, rate_limit_middleware, timeout_middleware,
    RateLimiterState,
};
use crate::http::{FrontendService, GatewayError, RpcGateway};
use crate::license::LicenseService;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::rpc::RpcService;
use crate::store::{SettingStore, StoreError};

pub mod secret;

/// Bound on draining in-flight requests at shutdown.
const HTTP_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Error type for server construction and start.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to provision session secret: {0}")]
    Provision(#[from] StoreError),

    #[error("failed to register rpc gateway: {0}")]
    Gateway(#[from] GatewayError),

    #[error("http listener error: {0}")]
    Serve(#[source] std::io::Error),
}

/// State injected into the catch-all handler.
#[derive(Clone)]
struct AppState {
    gateway: Arc<RpcGateway>,
    frontend: FrontendService,
}

/// The long-lived server aggregate. One instance per process.
pub struct Server {
    profile: Profile,
    store: Arc<dyn SettingStore>,
    secret: String,
    router: Router,
    license: Arc<LicenseService>,
    rpc: Arc<dyn RpcService>,
    handle: Handle,
    rpc_task: Mutex<Option<JoinHandle<()>>>,
}

impl Server {
    /// Construct the server: provision the secret, assemble the
    /// middleware pipeline and route table, register the gateway.
    ///
    /// Strictly sequential; any failure aborts construction.
    pub async fn new(
        profile: Profile,
        store: Arc<dyn SettingStore>,
        rpc: Arc<dyn RpcService>,
    ) -> Result<Self, ServerError> {
        let secret = secret::provision_secret(&profile, store.as_ref()).await?;

        // Gateway registration is fatal: a general listener that cannot
        // reach the RPC surface must never report as started.
        let gateway = Arc::new(RpcGateway::new(profile.rpc_port())?);
        let frontend = FrontendService::new(profile.dist.clone());
        let limiter = Arc::new(RateLimiterState::default());
        let api_v1 = ApiV1Service::new(&profile, &secret);

        let state = AppState { gateway, frontend };

        // Layers run top-down in reverse registration order: classify
        // first, then access log, cors, timeout, rate limit.
        let router = Router::new()
            .route("/healthz", get(healthz))
            .fallback(fallback)
            .with_state(state)
            .merge(api_v1.into_router())
            .layer(middleware::from_fn_with_state(
                limiter,
                rate_limit_middleware,
            ))
            .layer(middleware::from_fn(timeout_middleware))
            .layer(middleware::from_fn(cors_middleware))
            .layer(middleware::from_fn(access_log_middleware))
            .layer(middleware::from_fn(classify_middleware));

        let license = Arc::new(LicenseService::new(store.clone()));

        Ok(Self {
            profile,
            store,
            secret,
            router,
            license,
            rpc,
            handle: Handle::new(),
            rpc_task: Mutex::new(None),
        })
    }

    /// The provisioned session-signing secret.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Run the server until shutdown or a fatal listener error.
    ///
    /// The binary-RPC listener runs on its own task; only the general
    /// listener occupies the calling task. A trigger on `shutdown`
    /// starts the bounded drain of the general listener.
    pub async fn start(&self, shutdown: &Shutdown) -> Result<(), ServerError> {
        // Best-effort subscription load. Runs to completion on its own
        // task; shutdown does not cancel it.
        let license = self.license.clone();
        tokio::spawn(async move {
            match license.load_subscription().await {
                Ok(Some(subscription)) => {
                    tracing::info!(key = %subscription.key, "subscription loaded")
                }
                Ok(None) => tracing::debug!("no subscription configured"),
                Err(e) => tracing::error!(error = %e, "failed to load subscription"),
            }
        });

        // Binary-RPC listener. Bind and serve failures are logged, never
        // propagated: the general listener serves regardless.
        let rpc = self.rpc.clone();
        let rpc_addr = SocketAddr::from(([0, 0, 0, 0], self.profile.rpc_port()));
        let rpc_task = tokio::spawn(async move {
            match TcpListener::bind(rpc_addr).await {
                Ok(listener) => {
                    if let Err(e) = rpc.serve(listener).await {
                        tracing::error!(error = %e, "rpc listener stopped with error");
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, address = %rpc_addr, "failed to bind rpc listener")
                }
            }
        });
        *self.rpc_task.lock().expect("rpc task mutex poisoned") = Some(rpc_task);

        metrics::record_server_start();

        let handle = self.handle.clone();
        let mut rx = shutdown.subscribe();
        tokio::spawn(async move {
            let _ = rx.recv().await;
            tracing::info!("shutdown signal received, draining http listener");
            handle.graceful_shutdown(Some(HTTP_DRAIN_TIMEOUT));
        });

        let addr = SocketAddr::from(([0, 0, 0, 0], self.profile.port));
        tracing::info!(address = %addr, mode = ?self.profile.mode, "http listener starting");
        axum_server::bind(addr)
            .handle(self.handle.clone())
            .serve(
                self.router
                    .clone()
                    .into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .map_err(ServerError::Serve)?;

        tracing::info!("http listener stopped");
        Ok(())
    }

    /// Tear down in reverse dependency order. Best-effort: every step is
    /// attempted even when an earlier one fails.
    pub async fn shutdown(&self) {
        // Idempotent when start() already drained on signal; also covers
        // direct shutdown without a prior trigger.
        self.handle.graceful_shutdown(Some(HTTP_DRAIN_TIMEOUT));

        let rpc_task = self.rpc_task.lock().expect("rpc task mutex poisoned").take();
        if let Some(task) = rpc_task {
            task.abort();
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    tracing::error!(error = %e, "rpc listener task failed");
                }
            }
            tracing::info!("rpc listener stopped");
        }

        if let Err(e) = self.store.close().await {
            tracing::error!(error = %e, "failed to close store");
        }

        tracing::info!("server stopped properly");
    }
}

/// Liveness endpoint: fixed payload, no downstream calls.
async fn healthz() -> &'static str {
    "Service ready."
}

/// Catch-all for everything outside the route table: RPC-classified
/// requests go through the gateway, the rest to the frontend assets.
async fn fallback(State(state): State<AppState>, request: Request<Body>) -> Response {
    if class_of(&request).is_rpc() {
        state.gateway.forward(request).await
    } else {
        state.frontend.serve(request).await
    }
}
