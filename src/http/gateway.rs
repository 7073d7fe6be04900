//! Gateway translation layer.
//!
//! Lets a single public port serve both protocols: requests under the
//! RPC path prefix arriving on the general listener are rewritten to the
//! loopback RPC port and forwarded, so clients that cannot speak the
//! native RPC wire format still reach the RPC service.

use std::str::FromStr;

use axum::{
    body::Body,
    extract::Request,
    http::{
        uri::{Authority, Scheme},
        StatusCode, Uri,
    },
    response::{IntoResponse, Response},
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;

/// Error type for gateway registration.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid rpc upstream authority: {0}")]
    Authority(#[from] axum::http::uri::InvalidUri),
}

/// Forwarder from the general listener to the binary-RPC listener.
#[derive(Clone)]
pub struct RpcGateway {
    client: Client<HttpConnector, Body>,
    authority: Authority,
}

impl RpcGateway {
    /// Build the gateway for the given RPC port.
    ///
    /// Must succeed before the server counts as constructed; a gateway
    /// that cannot address its upstream is a fatal startup error.
    pub fn new(rpc_port: u16) -> Result<Self, GatewayError> {
        let authority = Authority::from_str(&format!("127.0.0.1:{rpc_port}"))?;
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Ok(Self { client, authority })
    }

    /// Forward one RPC-classified request to the RPC listener.
    pub async fn forward(&self, request: Request<Body>) -> Response {
        let (mut parts, body) = request.into_parts();

        let mut uri_parts = parts.uri.clone().into_parts();
        uri_parts.scheme = Some(Scheme::HTTP);
        uri_parts.authority = Some(self.authority.clone());
        parts.uri = match Uri::from_parts(uri_parts) {
            Ok(uri) => uri,
            Err(e) => {
                tracing::error!(error = %e, "failed to rewrite rpc uri");
                return StatusCode::BAD_GATEWAY.into_response();
            }
        };

        let upstream = Request::from_parts(parts, body);
        match self.client.request(upstream).await {
            Ok(response) => {
                let (parts, body) = response.into_parts();
                Response::from_parts(parts, Body::new(body))
            }
            Err(e) => {
                tracing::error!(error = %e, "rpc upstream request failed");
                StatusCode::BAD_GATEWAY.into_response()
            }
        }
    }
}
