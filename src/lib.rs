//! Entry-point request pipeline for the Sanskriti Setu backend.
//!
//! Every inbound request passes through one fixed chain of cross-cutting
//! stages (security headers, compression, access logging, rate limiting,
//! CORS, body limits, static assets) before being dispatched by path prefix
//! to a feature router. Feature routers (auth, users, cultural, matches,
//! chat) are owned by their own services and mounted through
//! [`routing::RouteTable`]; this crate owns everything around them.

// Core subsystems
pub mod config;
pub mod http;
pub mod pipeline;
pub mod routing;

// Cross-cutting concerns
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::GatewayConfig;
pub use http::server::GatewayServer;
pub use lifecycle::Shutdown;
