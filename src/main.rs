//! Sanskriti Setu gateway binary.
//!
//! Assembles the shared request pipeline and mounts the feature routers.
//! The pipeline owns every cross-cutting concern; feature routers own
//! their own handlers and middleware.

use axum::Router;
use tokio::net::TcpListener;

use setu_gateway::config;
use setu_gateway::lifecycle::{signals, Shutdown};
use setu_gateway::observability::{logging, metrics};
use setu_gateway::routing::{RouteTable, FEATURE_PREFIXES};
use setu_gateway::GatewayServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional .env file, same contract as the rest of the deployment.
    let _ = dotenvy::dotenv();

    let config = config::from_env()?;
    logging::init(&config.observability);

    tracing::info!(
        bind_address = %config.bind_address,
        environment = %config.environment,
        rate_limit_window_ms = config.rate_limit.window_ms,
        rate_limit_max = config.rate_limit.max_requests,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Feature routers are owned by their services; the gateway only knows
    // their mount prefixes. Empty routers stand in until they are linked.
    let mut routes = RouteTable::new();
    for prefix in FEATURE_PREFIXES {
        routes.mount(prefix, Router::new())?;
    }

    let listener = TcpListener::bind(&config.bind_address).await?;
    let server = GatewayServer::new(config, routes)?;

    let shutdown = Shutdown::new();
    signals::spawn_listener(shutdown.clone());

    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
