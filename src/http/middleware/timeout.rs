//! Request timeout guard.
//!
//! Bounds every general request to a fixed wall-clock budget. Binary-RPC
//! traffic is exempt; long-lived RPC calls manage their own deadlines.

use std::time::Duration;

use axum::{
    body::Body,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::classify::class_of;

/// Wall-clock budget for a single request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn timeout_middleware(request: Request<Body>, next: Next) -> Response {
    if class_of(&request).is_rpc() {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let path = request.uri().path().to_string();

    match tokio::time::timeout(REQUEST_TIMEOUT, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(method = %method, path = %path, "request exceeded timeout budget");
            (StatusCode::SERVICE_UNAVAILABLE, "request timed out").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::any, Router};
    use tower::util::ServiceExt;

    use crate::http::classify::classify_middleware;

    fn slow_app() -> Router {
        Router::new()
            .route(
                "/{*path}",
                any(|| async {
                    tokio::time::sleep(Duration::from_secs(40)).await;
                    "done"
                }),
            )
            .layer(middleware::from_fn(timeout_middleware))
            .layer(middleware::from_fn(classify_middleware))
    }

    #[tokio::test(start_paused = true)]
    async fn slow_general_request_times_out() {
        let response = slow_app()
            .oneshot(
                Request::builder()
                    .uri("/slow/endpoint")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test(start_paused = true)]
    async fn rpc_classified_request_is_exempt() {
        let response = slow_app()
            .oneshot(
                Request::builder()
                    .uri("/pinstack.api.v2.WorkspaceService/Slow")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
