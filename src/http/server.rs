//! Gateway server assembly.
//!
//! # Responsibilities
//! - Build the shared application state
//! - Assemble the pipeline via the pipeline module
//! - Spawn the dependency probe
//! - Serve with connection info and graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{http::header::InvalidHeaderValue, Router};
use tokio::net::TcpListener;
use tower_http::services::{ServeDir, ServeFile};

use crate::config::GatewayConfig;
use crate::health::{probe, DependencyHealth};
use crate::lifecycle::Shutdown;
use crate::pipeline::{self, PipelineError};
use crate::routing::RouteTable;
use crate::security::{CorsPolicy, FixedWindowLimiter};

/// Error assembling the gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("cors.allowed_origin is not a usable header value: {0}")]
    CorsOrigin(#[from] InvalidHeaderValue),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Application state injected into handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub health: Arc<DependencyHealth>,
    pub limiter: Arc<FixedWindowLimiter>,
    pub cors: Arc<CorsPolicy>,
    /// Frontend bundle service; present only in production.
    pub spa: Option<ServeDir<ServeFile>>,
}

impl AppState {
    pub fn new(
        config: GatewayConfig,
        health: Arc<DependencyHealth>,
    ) -> Result<Self, GatewayError> {
        let limiter = Arc::new(FixedWindowLimiter::new(&config.rate_limit));
        let cors = Arc::new(CorsPolicy::new(&config.cors)?);
        let spa = config.environment.is_production().then(|| {
            ServeDir::new(&config.static_files.client_build_dir)
                .fallback(ServeFile::new(config.static_files.index_path()))
        });
        Ok(Self {
            config: Arc::new(config),
            health,
            limiter,
            cors,
            spa,
        })
    }
}

/// The assembled gateway: configuration, state, and the request pipeline.
pub struct GatewayServer {
    router: Router,
    config: Arc<GatewayConfig>,
    health: Arc<DependencyHealth>,
}

impl GatewayServer {
    /// Build the pipeline around the given feature mounts.
    pub fn new(config: GatewayConfig, routes: RouteTable) -> Result<Self, GatewayError> {
        let health = Arc::new(DependencyHealth::new());
        let state = AppState::new(config, health.clone())?;
        let config = state.config.clone();
        let router = pipeline::build_pipeline(&config, routes, state)?;
        Ok(Self {
            router,
            config,
            health,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Handle to the dependency state cell (read-only use expected).
    pub fn health(&self) -> Arc<DependencyHealth> {
        self.health.clone()
    }

    /// The assembled pipeline; cloneable for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server. The dependency probe is spawned here and never
    /// blocks startup; requests arriving before it resolves observe
    /// "connecting".
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            environment = %self.config.environment,
            "Gateway starting"
        );

        probe::spawn(
            self.health.clone(),
            self.config.dependency.clone(),
            shutdown.subscribe(),
        );

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();
        let mut rx = shutdown.subscribe();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.recv().await;
            })
            .await?;

        tracing::info!("Gateway stopped");
        Ok(())
    }
}
