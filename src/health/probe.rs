//! Background connection probe for the backing data store.
//!
//! One task, spawned at startup and never awaited by request handlers.
//! It makes a single bounded connection attempt, publishes the outcome to
//! [`DependencyHealth`], and then watches the socket so a later drop is
//! reflected as Disconnected. There is no automatic retry; the cell keeps
//! the last known state.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use url::Url;

use crate::config::DependencyConfig;
use crate::health::state::{ConnectionState, DependencyHealth};

const DEFAULT_MONGODB_PORT: u16 = 27017;

/// Error resolving the dependency target from its URI.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("dependency uri '{0}' is not a valid URL")]
    InvalidUri(String),

    #[error("dependency uri '{0}' has no host")]
    MissingHost(String),
}

/// Extract the (host, port) connection target from a `mongodb://` style URI.
pub fn dependency_addr(uri: &str) -> Result<(String, u16), ProbeError> {
    let url = Url::parse(uri).map_err(|_| ProbeError::InvalidUri(uri.to_string()))?;
    let host = url
        .host_str()
        .ok_or_else(|| ProbeError::MissingHost(uri.to_string()))?
        .to_string();
    let port = url.port().unwrap_or(DEFAULT_MONGODB_PORT);
    Ok((host, port))
}

/// Spawn the probe task. Resolution failures surface as Disconnected, the
/// same as an unreachable target.
pub fn spawn(
    health: Arc<DependencyHealth>,
    config: DependencyConfig,
    shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        run(health, config, shutdown).await;
    })
}

async fn run(
    health: Arc<DependencyHealth>,
    config: DependencyConfig,
    mut shutdown: broadcast::Receiver<()>,
) {
    let (host, port) = match dependency_addr(&config.uri) {
        Ok(target) => target,
        Err(e) => {
            tracing::error!(error = %e, "Dependency target unresolvable");
            health.record_transition(ConnectionState::Disconnected);
            return;
        }
    };

    let select_timeout = Duration::from_millis(config.server_selection_timeout_ms);
    tracing::info!(host = %host, port, timeout_ms = config.server_selection_timeout_ms, "Connecting to dependency");

    let stream = tokio::select! {
        attempt = timeout(select_timeout, TcpStream::connect((host.as_str(), port))) => {
            match attempt {
                Ok(Ok(stream)) => stream,
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "Dependency connection failed");
                    health.record_transition(ConnectionState::Disconnected);
                    return;
                }
                Err(_) => {
                    tracing::warn!(timeout_ms = config.server_selection_timeout_ms, "Dependency connection timed out");
                    health.record_transition(ConnectionState::Disconnected);
                    return;
                }
            }
        }
        _ = shutdown.recv() => return,
    };

    health.record_transition(ConnectionState::Connected);
    watch_socket(stream, &health, &config, shutdown).await;
}

/// Hold the established socket and record Disconnected when it drops.
///
/// Each wait on the socket is bounded by the idle timeout; an idle expiry
/// alone leaves the last known state untouched and keeps watching.
async fn watch_socket(
    mut stream: TcpStream,
    health: &DependencyHealth,
    config: &DependencyConfig,
    mut shutdown: broadcast::Receiver<()>,
) {
    let idle = Duration::from_millis(config.socket_idle_timeout_ms);
    let mut buf = [0u8; 1024];

    loop {
        tokio::select! {
            read = timeout(idle, stream.read(&mut buf)) => {
                match read {
                    // Idle window elapsed with no traffic; the socket is
                    // still open as far as we know.
                    Err(_) => continue,
                    // Remote close or transport error.
                    Ok(Ok(0)) | Ok(Err(_)) => {
                        health.record_transition(ConnectionState::Disconnected);
                        return;
                    }
                    Ok(Ok(_)) => continue,
                }
            }
            _ = shutdown.recv() => return,
        }
    }
}
