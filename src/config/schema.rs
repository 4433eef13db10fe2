//! Configuration schema definitions.
//!
//! All types derive Serde traits so a config snapshot can be logged or
//! exported; the canonical source is the process environment (see
//! `loader.rs`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Deployment environment, parsed from `NODE_ENV`.
///
/// Controls error-detail redaction and whether the SPA fallback is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Environment::Development),
            "production" => Ok(Environment::Production),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

/// Root configuration for the gateway.
///
/// Immutable for the process lifetime once built by the loader.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,

    /// Deployment environment.
    pub environment: Environment,

    /// CORS policy settings.
    pub cors: CorsConfig,

    /// Maximum accepted request body size in bytes.
    pub body_limit_bytes: usize,

    /// Rate limiting settings.
    pub rate_limit: RateLimitConfig,

    /// Backing data-store connectivity settings.
    pub dependency: DependencyConfig,

    /// Static file locations.
    pub static_files: StaticConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
            environment: Environment::default(),
            cors: CorsConfig::default(),
            body_limit_bytes: 10 * 1024 * 1024,
            rate_limit: RateLimitConfig::default(),
            dependency: DependencyConfig::default(),
            static_files: StaticConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// CORS policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// The single allowed browser origin.
    pub allowed_origin: String,

    /// Whether credentialed requests are allowed. When true the allowed
    /// origin must be specific, never a wildcard.
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origin: "http://localhost:3000".to_string(),
            allow_credentials: true,
        }
    }
}

/// Fixed-window rate limit configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Window length in milliseconds.
    pub window_ms: u64,

    /// Maximum admitted requests per identity per window.
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            // 15 minutes
            window_ms: 15 * 60 * 1000,
            max_requests: 100,
        }
    }
}

/// Backing data-store connection settings.
///
/// The gateway only tracks connectivity; it never issues queries.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DependencyConfig {
    /// Connection target (`MONGODB_URI`).
    pub uri: String,

    /// Upper bound on the initial connection attempt, in milliseconds.
    pub server_selection_timeout_ms: u64,

    /// Upper bound on any single wait on the open socket, in milliseconds.
    pub socket_idle_timeout_ms: u64,
}

impl Default for DependencyConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017/sanskriti-setu".to_string(),
            server_selection_timeout_ms: 5_000,
            socket_idle_timeout_ms: 45_000,
        }
    }
}

/// Static file locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticConfig {
    /// Directory served under `/uploads`.
    pub uploads_dir: PathBuf,

    /// Prebuilt frontend bundle, served only in production.
    pub client_build_dir: PathBuf,

    /// Fallback document for client-side routing, relative to the bundle dir.
    pub index_file: String,
}

impl StaticConfig {
    /// Absolute-ish path to the SPA index document.
    pub fn index_path(&self) -> PathBuf {
        self.client_build_dir.join(&self.index_file)
    }
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            uploads_dir: PathBuf::from("uploads"),
            client_build_dir: PathBuf::from("../client/build"),
            index_file: "index.html".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default tracing filter when RUST_LOG is unset.
    pub log_filter: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "setu_gateway=debug,tower_http=debug".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
