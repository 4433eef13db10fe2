//! Shared utilities for pipeline and live-server tests.

#![allow(dead_code)]

use std::net::SocketAddr;

use axum::{
    body::{Body, Bytes},
    response::Response,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;

use setu_gateway::config::GatewayConfig;
use setu_gateway::lifecycle::Shutdown;
use setu_gateway::routing::RouteTable;
use setu_gateway::GatewayServer;

/// Development-mode config with a dependency target nothing listens on,
/// so health state is deterministic in tests.
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.bind_address = "127.0.0.1:0".to_string();
    config.body_limit_bytes = 10 * 1024 * 1024;
    config.dependency.uri = "mongodb://127.0.0.1:1/test".to_string();
    config.dependency.server_selection_timeout_ms = 200;
    config
}

async fn echo(body: Bytes) -> Bytes {
    body
}

async fn boom() -> &'static str {
    panic!("boom")
}

/// Feature mounts exercising the externally-owned side of the contract:
/// a normal route, a body-reading route, and a failing route.
pub fn feature_routes() -> RouteTable {
    let mut routes = RouteTable::new();
    routes
        .mount(
            "/api/users",
            Router::new()
                .route("/me", get(|| async { "ok" }))
                .route("/echo", post(echo)),
        )
        .unwrap();
    routes
        .mount("/api/auth", Router::new().route("/boom", get(boom)))
        .unwrap();
    routes
}

pub fn build_server(config: GatewayConfig) -> GatewayServer {
    GatewayServer::new(config, feature_routes()).unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as a string.
pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Start a gateway on an ephemeral port, returning its address and the
/// shutdown handle.
pub async fn spawn_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind(&config.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = build_server(config);
    let shutdown = Shutdown::new();
    let run_shutdown = shutdown.clone();
    tokio::spawn(async move {
        server.run(listener, run_shutdown).await.unwrap();
    });
    (addr, shutdown)
}

/// An empty request with no connection info, as the pipeline sees when
/// client identity is unavailable.
pub fn get_request(uri: &str) -> axum::http::Request<Body> {
    axum::http::Request::builder()
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}
