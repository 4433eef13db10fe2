//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! Process environment (NODE_ENV, MONGODB_URI, PORT, ...)
//!     → loader.rs (read + parse into GatewayConfig)
//!     → validation.rs (semantic checks, all errors at once)
//!     → Frozen GatewayConfig shared read-only by every stage
//! ```
//!
//! # Design Decisions
//! - Config is built exactly once at startup; handlers never read env vars
//! - The environment mode is a typed enum, not a string compared ad hoc
//! - Validation returns every error, not just the first

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{from_env, ConfigError};
pub use schema::{
    CorsConfig, DependencyConfig, Environment, GatewayConfig, ObservabilityConfig,
    RateLimitConfig, StaticConfig,
};
