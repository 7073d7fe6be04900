//! Static frontend asset serving.
//!
//! Serves a built dist directory as the non-RPC fallback. Building and
//! packaging the assets is someone else's job; a deployment without a
//! dist directory simply 404s.

use std::path::PathBuf;

use axum::{
    body::Body,
    extract::Request,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tower::util::ServiceExt;
use tower_http::services::ServeDir;

#[derive(Clone)]
pub struct FrontendService {
    dist: Option<ServeDir>,
}

impl FrontendService {
    pub fn new(dist: Option<PathBuf>) -> Self {
        Self {
            dist: dist.map(ServeDir::new),
        }
    }

    /// Serve a general (non-RPC) request that matched no route.
    pub async fn serve(&self, request: Request<Body>) -> Response {
        let Some(dist) = self.dist.clone() else {
            return StatusCode::NOT_FOUND.into_response();
        };

        match dist.oneshot(request).await {
            Ok(response) => response.map(Body::new),
            Err(e) => {
                tracing::error!(error = %e, "failed to serve static asset");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
