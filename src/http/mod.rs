//! HTTP surface owned by this crate.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, graceful shutdown)
//!     → request.rs (request ID stamped before anything else)
//!     → [pipeline stages, feature routers]
//!     → handlers.rs (health endpoint, SPA fallback, 404, 500)
//! ```

pub mod handlers;
pub mod request;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, GatewayError, GatewayServer};
