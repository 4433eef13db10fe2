//! Dependency health subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     probe.rs spawns one background task
//!     → bounded TCP connect to the data store
//!     → record_transition(Connected | Disconnected) on state.rs
//!     → on Connected, watch the socket; drop → Disconnected
//!
//! Request path:
//!     GET /api/health → state.rs observe() (non-blocking, last known state)
//! ```
//!
//! # Design Decisions
//! - Requests only ever read the state; the probe is the sole writer
//! - No automatic reconnect: the cell holds the last known state
//! - Every await in the probe is bounded by an explicit timeout

pub mod probe;
pub mod state;

pub use state::{ConnectionState, DependencyHealth, HealthSnapshot};
