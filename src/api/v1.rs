//! API v1 route registration.
//!
//! The interesting part here is the wiring contract, not the handlers:
//! registration requires the provisioned session secret, so the lifecycle
//! manager must never reach this point with an unset secret. Handlers
//! pick the secret up from request extensions when signing sessions.

use std::sync::Arc;

use axum::{extract::State, routing::get, Extension, Json, Router};
use serde::Serialize;

use crate::config::{Mode, Profile};

/// Session-signing secret made available to the v1 handlers.
#[derive(Debug, Clone)]
pub struct SessionSecret(pub Arc<str>);

#[derive(Debug, Serialize)]
struct WorkspaceProfile {
    mode: Mode,
    version: &'static str,
}

/// Registers the versioned HTTP API routes.
pub struct ApiV1Service {
    profile: Profile,
    secret: SessionSecret,
}

impl ApiV1Service {
    pub fn new(profile: &Profile, secret: &str) -> Self {
        debug_assert!(!secret.is_empty());
        Self {
            profile: profile.clone(),
            secret: SessionSecret(Arc::from(secret)),
        }
    }

    /// Build the route table for this API version.
    pub fn into_router(self) -> Router {
        Router::new()
            .route("/api/v1/workspace/profile", get(workspace_profile))
            .layer(Extension(self.secret))
            .with_state(self.profile)
    }
}

async fn workspace_profile(State(profile): State<Profile>) -> Json<WorkspaceProfile> {
    Json(WorkspaceProfile {
        mode: profile.mode,
        version: env!("CARGO_PKG_VERSION"),
    })
}
