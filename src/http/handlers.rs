//! Terminal handlers: health endpoint, SPA fallback, 404 and 500 responders.

use std::any::Any;

use axum::{
    extract::{Request, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::json;
use tower::ServiceExt;

use crate::config::Environment;
use crate::health::HealthSnapshot;
use crate::http::server::AppState;

/// Body of every 404.
pub const NOT_FOUND_MESSAGE: &str = "Route not found";

/// Body of every 500.
pub const ERROR_MESSAGE: &str = "Something went wrong!";

/// Body of `GET /api/health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub environment: &'static str,
    pub mongodb: HealthSnapshot,
}

/// `GET /api/health`.
///
/// Always 200: liveness of this process is distinct from liveness of its
/// dependency, so a degraded data store shows up in the body, never in
/// the status code.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        environment: state.config.environment.as_str(),
        mongodb: state.health.snapshot(),
    })
}

/// Terminal 404.
pub fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": NOT_FOUND_MESSAGE })),
    )
        .into_response()
}

/// Catch-all for requests no route or reserved static prefix claimed.
///
/// In production, GET and HEAD requests fall through to the frontend
/// bundle: an existing file is served as-is, anything else resolves to
/// the index document so client-side routing works. Everything else, and
/// every unmatched request in development, is a 404.
pub async fn terminal_fallback(State(state): State<AppState>, request: Request) -> Response {
    if let Some(spa) = &state.spa {
        if *request.method() == Method::GET || *request.method() == Method::HEAD {
            return match spa.clone().oneshot(request).await {
                Ok(response) => response.into_response(),
                Err(infallible) => match infallible {},
            };
        }
    }
    not_found()
}

/// Build the responder the error layer uses for unhandled failures.
///
/// The underlying detail is included only in development; production
/// redacts it to an empty object so internal messages never leak.
pub fn panic_responder(
    environment: Environment,
) -> impl Fn(Box<dyn Any + Send + 'static>) -> Response + Clone {
    move |err: Box<dyn Any + Send + 'static>| {
        let detail = if let Some(s) = err.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = err.downcast_ref::<&str>() {
            (*s).to_string()
        } else {
            "unhandled failure".to_string()
        };

        tracing::error!(error = %detail, "Unhandled failure in request pipeline");

        let error_detail = if environment.is_production() {
            json!({})
        } else {
            json!(detail)
        };
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": ERROR_MESSAGE, "error": error_detail })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn not_found_body_is_fixed() {
        let response = not_found();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body, json!({ "message": "Route not found" }));
    }

    #[tokio::test]
    async fn development_responder_includes_detail() {
        let responder = panic_responder(Environment::Development);
        let response = responder(Box::new("db handle poisoned".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["message"], ERROR_MESSAGE);
        assert_eq!(body["error"], "db handle poisoned");
    }

    #[tokio::test]
    async fn production_responder_redacts_detail() {
        let responder = panic_responder(Environment::Production);
        let response = responder(Box::new("db handle poisoned".to_string()));
        let body = body_json(response).await;
        assert_eq!(body["message"], ERROR_MESSAGE);
        assert_eq!(body["error"], json!({}));
    }
}
