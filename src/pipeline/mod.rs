//! Pipeline assembly.
//!
//! # Data Flow
//! ```text
//! Request
//!     → security headers → compression → access log → rate limit
//!     → CORS → body limit → reserved static prefixes → route dispatch
//!     → SPA fallback (production) → 404
//!     unhandled failure anywhere past the access log → error responder
//! ```
//!
//! # Design Decisions
//! - Stage order is data ([`STAGE_ORDER`]), checked at startup and
//!   assertable in tests independent of registration call order
//! - The access log and the header/compression stages sit outside the
//!   error responder so rejections and 500s are still logged and dressed
//! - Rate limiting runs before CORS and body work to cut wasted effort
//!   under abuse; the 404 is strictly last with no further fallthrough
//!
//! A request-ID stamp wraps the whole chain; it is correlation plumbing,
//! not a decision stage, so it is not part of the declared order.

use axum::{
    middleware,
    routing::{any, get},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::handlers;
use crate::http::request::{UuidRequestId, X_REQUEST_ID};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::routing::RouteTable;
use crate::security::{cors, headers, limits, rate_limit};

/// One ordered unit of cross-cutting request processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    SecurityHeaders,
    Compression,
    AccessLog,
    RateLimit,
    Cors,
    BodyLimit,
    StaticAssets,
    RouteDispatch,
    SpaFallback,
    ErrorResponder,
    NotFound,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::SecurityHeaders => "security-headers",
            Stage::Compression => "compression",
            Stage::AccessLog => "access-log",
            Stage::RateLimit => "rate-limit",
            Stage::Cors => "cors",
            Stage::BodyLimit => "body-limit",
            Stage::StaticAssets => "static-assets",
            Stage::RouteDispatch => "route-dispatch",
            Stage::SpaFallback => "spa-fallback",
            Stage::ErrorResponder => "error-responder",
            Stage::NotFound => "not-found",
        }
    }
}

/// The fixed stage sequence every request traverses.
pub const STAGE_ORDER: [Stage; 11] = [
    Stage::SecurityHeaders,
    Stage::Compression,
    Stage::AccessLog,
    Stage::RateLimit,
    Stage::Cors,
    Stage::BodyLimit,
    Stage::StaticAssets,
    Stage::RouteDispatch,
    Stage::SpaFallback,
    Stage::ErrorResponder,
    Stage::NotFound,
];

/// Violation of the pipeline ordering invariants.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("stage '{}' is missing", .0.as_str())]
    Missing(Stage),

    #[error("stage '{}' appears more than once", .0.as_str())]
    Duplicate(Stage),

    #[error("stage '{}' must run before '{}'", .before.as_str(), .after.as_str())]
    Misordered { before: Stage, after: Stage },

    #[error("stage '{}' must be terminal", .0.as_str())]
    NotTerminal(Stage),
}

/// Check the ordering invariants of a declared stage sequence.
///
/// The access log must observe every request including rejected ones, so
/// it precedes rate limiting; rate limiting and CORS precede body work;
/// the error responder is the last stage able to intercept failures; the
/// 404 is the catch-all tail.
pub fn verify_stage_order(order: &[Stage]) -> Result<(), PipelineError> {
    let position = |stage: Stage| -> Result<usize, PipelineError> {
        let mut found = None;
        for (i, s) in order.iter().enumerate() {
            if *s == stage {
                if found.is_some() {
                    return Err(PipelineError::Duplicate(stage));
                }
                found = Some(i);
            }
        }
        found.ok_or(PipelineError::Missing(stage))
    };

    for stage in STAGE_ORDER {
        position(stage)?;
    }

    let ordered_pairs = [
        (Stage::SecurityHeaders, Stage::RateLimit),
        (Stage::AccessLog, Stage::RateLimit),
        (Stage::RateLimit, Stage::Cors),
        (Stage::Cors, Stage::BodyLimit),
        (Stage::BodyLimit, Stage::StaticAssets),
        (Stage::StaticAssets, Stage::RouteDispatch),
        (Stage::RouteDispatch, Stage::SpaFallback),
        (Stage::SpaFallback, Stage::ErrorResponder),
    ];
    for (before, after) in ordered_pairs {
        if position(before)? >= position(after)? {
            return Err(PipelineError::Misordered { before, after });
        }
    }

    if position(Stage::NotFound)? != order.len() - 1 {
        return Err(PipelineError::NotTerminal(Stage::NotFound));
    }
    if position(Stage::ErrorResponder)? != order.len() - 2 {
        return Err(PipelineError::NotTerminal(Stage::ErrorResponder));
    }

    Ok(())
}

/// Assemble the request pipeline in the declared stage order.
///
/// Axum layers wrap inside-out, so the stages are applied innermost
/// (route dispatch) to outermost (security headers); reading the `layer`
/// calls bottom-up recovers [`STAGE_ORDER`].
pub fn build_pipeline(
    config: &GatewayConfig,
    routes: RouteTable,
    state: AppState,
) -> Result<Router, PipelineError> {
    verify_stage_order(&STAGE_ORDER)?;

    // Stages 9 and 11 share the fallback: it serves the frontend bundle
    // only when the state carries one (production), otherwise the 404.
    let core = Router::new()
        .route("/api/health", get(handlers::health))
        .fallback(handlers::terminal_fallback)
        .with_state(state.clone());

    let router = core
        // Stage 7: reserved static prefixes. A miss falls through to the
        // fixed 404 body, same as any other unmatched request.
        .nest_service(
            "/uploads",
            ServeDir::new(&config.static_files.uploads_dir)
                .fallback(any(|| async { handlers::not_found() })),
        )
        // Stage 8: externally-owned feature routers.
        .merge(routes.into_router())
        // Stage 6: body ceiling, declared length first, then streamed.
        .layer(RequestBodyLimitLayer::new(config.body_limit_bytes))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            limits::body_limit_middleware,
        ))
        // Stage 5: CORS gate.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            cors::cors_middleware,
        ))
        // Stage 4: rate limiting.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit_middleware,
        ))
        // Stage 10: catches unhandled failures from stages 4-9. Sits
        // inside logging and headers so its 500s are still logged and
        // carry the standard header set.
        .layer(CatchPanicLayer::custom(handlers::panic_responder(
            config.environment,
        )))
        // Stage 3: access logging and request metrics.
        .layer(middleware::from_fn(metrics::track_requests))
        .layer(TraceLayer::new_for_http())
        // Stage 2: response compression.
        .layer(CompressionLayer::new())
        // Stage 1: security headers on every response.
        .layer(middleware::from_fn(headers::security_headers))
        // Correlation plumbing outside the declared stages.
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
        .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId));

    Ok(router)
}
