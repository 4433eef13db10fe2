//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     mount(prefix, router) for each feature service
//!     → RouteTable (ordered, validated, frozen)
//!     → into_router() nests the mounts into the axum app
//!
//! Per request:
//!     path → longest matching prefix → feature router
//!     no match → static lookup → terminal layer
//! ```
//!
//! # Design Decisions
//! - Mounts are data: the table can be asserted in tests independent of
//!   registration call order
//! - Longest prefix wins, registration order breaks ties
//! - The table is immutable after startup; dispatch needs no locks

pub mod table;

pub use table::{RouteTable, RouteTableError};

/// Prefixes owned by external feature services.
pub const FEATURE_PREFIXES: [&str; 5] = [
    "/api/auth",
    "/api/users",
    "/api/cultural",
    "/api/matches",
    "/api/chat",
];
