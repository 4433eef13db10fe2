//! Configuration validation.
//!
//! Serde and the loader handle syntax; this module handles semantics.
//! Validation is a pure function over the assembled config and reports
//! every problem it finds, not just the first.

use std::net::SocketAddr;

use axum::http::HeaderValue;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("bind_address '{0}' is not a valid socket address")]
    BindAddress(String),

    #[error("cors.allowed_origin must not be empty")]
    EmptyOrigin,

    #[error("cors.allowed_origin must be a specific origin when credentials are allowed")]
    WildcardWithCredentials,

    #[error("cors.allowed_origin '{0}' is not a valid header value")]
    OriginNotHeaderSafe(String),

    #[error("rate_limit.window_ms must be greater than zero")]
    ZeroWindow,

    #[error("rate_limit.max_requests must be greater than zero")]
    ZeroMaxRequests,

    #[error("body_limit_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("dependency.uri '{0}' is not a valid URL")]
    DependencyUri(String),

    #[error("dependency.uri '{0}' has no host")]
    DependencyHost(String),

    #[error("dependency timeouts must be greater than zero")]
    ZeroTimeout,

    #[error("observability.metrics_address '{0}' is not a valid socket address")]
    MetricsAddress(String),
}

/// Check referential and range invariants across the whole config.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.bind_address.clone()));
    }

    let origin = &config.cors.allowed_origin;
    if origin.is_empty() {
        errors.push(ValidationError::EmptyOrigin);
    } else if origin == "*" && config.cors.allow_credentials {
        errors.push(ValidationError::WildcardWithCredentials);
    } else if HeaderValue::from_str(origin).is_err() {
        errors.push(ValidationError::OriginNotHeaderSafe(origin.clone()));
    }

    if config.rate_limit.window_ms == 0 {
        errors.push(ValidationError::ZeroWindow);
    }
    if config.rate_limit.max_requests == 0 {
        errors.push(ValidationError::ZeroMaxRequests);
    }
    if config.body_limit_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    match Url::parse(&config.dependency.uri) {
        Ok(url) if url.host_str().is_none() => {
            errors.push(ValidationError::DependencyHost(config.dependency.uri.clone()));
        }
        Ok(_) => {}
        Err(_) => errors.push(ValidationError::DependencyUri(config.dependency.uri.clone())),
    }
    if config.dependency.server_selection_timeout_ms == 0
        || config.dependency.socket_idle_timeout_ms == 0
    {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::GatewayConfig;

    fn base_config() -> GatewayConfig {
        GatewayConfig {
            bind_address: "0.0.0.0:5000".into(),
            body_limit_bytes: 10 * 1024 * 1024,
            ..GatewayConfig::default()
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&base_config()).is_ok());
    }

    #[test]
    fn rejects_wildcard_origin_with_credentials() {
        let mut config = base_config();
        config.cors.allowed_origin = "*".into();
        config.cors.allow_credentials = true;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::WildcardWithCredentials)));
    }

    #[test]
    fn collects_every_error() {
        let mut config = base_config();
        config.bind_address = "not-an-address".into();
        config.rate_limit.window_ms = 0;
        config.rate_limit.max_requests = 0;
        config.dependency.uri = "::::".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn rejects_dependency_uri_without_host() {
        let mut config = base_config();
        config.dependency.uri = "unix:/var/run/db.sock".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::DependencyHost(_))));
    }
}
