//! API v2 service, the concrete binary-RPC collaborator.
//!
//! Routes live under the service's fully qualified name so the gateway
//! prefix match on the general listener lines up with what this listener
//! serves. The method surface is intentionally minimal; the bookmark
//! CRUD handlers belong to another layer.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::State, routing::any, Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;

use crate::config::{Mode, Profile};
use crate::rpc::RpcService;
use crate::store::{SettingStore, WorkspaceSettingKey};

#[derive(Clone)]
struct ApiV2State {
    profile: Profile,
    store: Arc<dyn SettingStore>,
}

#[derive(Debug, Serialize)]
struct GetProfileResponse {
    mode: Mode,
    version: &'static str,
    licensed: bool,
}

pub struct ApiV2Service {
    state: ApiV2State,
}

impl ApiV2Service {
    pub fn new(profile: Profile, store: Arc<dyn SettingStore>) -> Self {
        Self {
            state: ApiV2State { profile, store },
        }
    }

    fn router(&self) -> Router {
        Router::new()
            .route(
                "/pinstack.api.v2.WorkspaceService/GetProfile",
                any(get_profile),
            )
            .with_state(self.state.clone())
    }
}

#[async_trait]
impl RpcService for ApiV2Service {
    async fn serve(self: Arc<Self>, listener: TcpListener) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "rpc listener starting");
        axum::serve(listener, self.router()).await
    }
}

async fn get_profile(State(state): State<ApiV2State>) -> Json<GetProfileResponse> {
    let licensed = state
        .store
        .get_workspace_setting(WorkspaceSettingKey::LicenseKey)
        .await
        .map(|setting| setting.is_some())
        .unwrap_or(false);

    Json(GetProfileResponse {
        mode: state.profile.mode,
        version: env!("CARGO_PKG_VERSION"),
        licensed,
    })
}
