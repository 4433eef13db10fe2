//! Request body size ceiling.
//!
//! Two layers of enforcement share the configured limit: this middleware
//! rejects requests whose declared Content-Length already exceeds it,
//! before any body bytes are read, and the wrapping
//! `RequestBodyLimitLayer` stops chunked bodies that never declared a
//! length. Both paths surface the same JSON error body; the plain-text
//! 413 the limited body produces is rewritten on the way out.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::http::server::AppState;

pub const PAYLOAD_TOO_LARGE_MESSAGE: &str = "Request payload too large";

fn payload_too_large() -> Response {
    (
        StatusCode::PAYLOAD_TOO_LARGE,
        Json(json!({ "message": PAYLOAD_TOO_LARGE_MESSAGE })),
    )
        .into_response()
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .is_some_and(|v| v.as_bytes().starts_with(b"application/json"))
}

fn declared_length(request: &Request<Body>) -> Option<u64> {
    request
        .headers()
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

/// Middleware owning the 413 contract for the body ceiling.
///
/// Oversized declared payloads are rejected before any body bytes are
/// read. Bodies that exceed the limit while streaming are stopped deeper
/// in the stack; their plain 413 is rewritten here so every rejection
/// carries the same JSON body.
pub async fn body_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if let Some(length) = declared_length(&request) {
        if length > state.config.body_limit_bytes as u64 {
            tracing::debug!(length, limit = state.config.body_limit_bytes, "Payload too large");
            return payload_too_large();
        }
    }

    let response = next.run(request).await;
    if response.status() == StatusCode::PAYLOAD_TOO_LARGE && !is_json(&response) {
        tracing::debug!(limit = state.config.body_limit_bytes, "Streamed payload too large");
        return payload_too_large();
    }
    response
}
