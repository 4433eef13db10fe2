//! Configuration loading from the process environment.

use std::env;
use std::str::FromStr;

use crate::config::schema::{Environment, GatewayConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build and validate a [`GatewayConfig`] from recognized environment
/// variables, falling back to defaults for anything unset.
///
/// Recognized: `NODE_ENV`, `PORT`, `MONGODB_URI`, `CLIENT_ORIGIN`,
/// `UPLOADS_DIR`, `CLIENT_BUILD_DIR`, `METRICS_ENABLED`, `METRICS_ADDR`.
pub fn from_env() -> Result<GatewayConfig, ConfigError> {
    let mut config = GatewayConfig::default();

    if let Ok(value) = env::var("NODE_ENV") {
        config.environment =
            Environment::from_str(&value).map_err(|reason| ConfigError::Invalid {
                key: "NODE_ENV",
                value,
                reason,
            })?;
    }

    let port: u16 = match env::var("PORT") {
        Ok(value) => value.parse().map_err(|_| ConfigError::Invalid {
            key: "PORT",
            value,
            reason: "expected a port number".to_string(),
        })?,
        Err(_) => 5000,
    };
    config.bind_address = format!("0.0.0.0:{port}");

    if let Ok(uri) = env::var("MONGODB_URI") {
        config.dependency.uri = uri;
    }
    if let Ok(origin) = env::var("CLIENT_ORIGIN") {
        config.cors.allowed_origin = origin;
    }
    if let Ok(dir) = env::var("UPLOADS_DIR") {
        config.static_files.uploads_dir = dir.into();
    }
    if let Ok(dir) = env::var("CLIENT_BUILD_DIR") {
        config.static_files.client_build_dir = dir.into();
    }
    if let Ok(value) = env::var("METRICS_ENABLED") {
        config.observability.metrics_enabled = matches!(value.as_str(), "1" | "true" | "yes");
    }
    if let Ok(addr) = env::var("METRICS_ADDR") {
        config.observability.metrics_address = addr;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
