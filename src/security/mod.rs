//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → headers.rs (conservative response headers, always)
//!     → rate_limit.rs (fixed-window admission per client identity)
//!     → cors.rs (decide which permissive headers, if any, to set)
//!     → limits.rs (body size ceiling)
//!     → Pass to routing
//! ```
//!
//! # Design Decisions
//! - Rate limiting runs before CORS and body parsing to cut wasted work
//! - CORS never blocks server-side processing; it only withholds headers
//! - Clients without a usable identity share one fallback bucket

pub mod cors;
pub mod headers;
pub mod limits;
pub mod rate_limit;

pub use cors::{CorsDecision, CorsPolicy};
pub use rate_limit::{Admission, FixedWindowLimiter};
