//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main):
//!     Load config → Validate → Assemble pipeline → Spawn probe → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → server drains, probe exits
//!
//! Signals (signals.rs):
//!     SIGTERM / Ctrl+C → trigger graceful shutdown
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
