//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All stages emit:
//!     → logging.rs (structured tracing events, request-scoped spans)
//!     → metrics.rs (request counters, latency histogram)
//!
//! Consumers:
//!     → stdout (tracing-subscriber, filter from RUST_LOG or config)
//!     → Prometheus scrape endpoint (opt-in via config)
//! ```
//!
//! # Design Decisions
//! - The access-log stage is `TraceLayer` plus a thin metrics middleware
//! - Metric labels are method and status only, never raw paths
//! - Metrics are opt-in; logging is always on

pub mod logging;
pub mod metrics;
