//! CORS gate.
//!
//! One configured origin, credentials supported. The gate only decides
//! which response headers to set: a mismatched origin gets no permissive
//! headers but the request is still processed, since CORS is enforced by
//! browsers, not servers.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::config::CorsConfig;
use crate::http::server::AppState;

const ALLOWED_METHODS: HeaderValue =
    HeaderValue::from_static("GET,POST,PUT,PATCH,DELETE,OPTIONS");
const PREFLIGHT_MAX_AGE: HeaderValue = HeaderValue::from_static("86400");

/// Headers to set for a given request origin.
#[derive(Debug, Clone)]
pub struct CorsDecision {
    pub allow: bool,
    pub headers: Vec<(HeaderName, HeaderValue)>,
}

/// Single-origin CORS policy.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed_origin: HeaderValue,
    allow_credentials: bool,
}

impl CorsPolicy {
    /// Build the policy. The origin has already passed config validation,
    /// so an unparsable header value here is a config bug.
    pub fn new(config: &CorsConfig) -> Result<Self, header::InvalidHeaderValue> {
        Ok(Self {
            allowed_origin: HeaderValue::from_str(&config.allowed_origin)?,
            allow_credentials: config.allow_credentials,
        })
    }

    /// Decide which CORS headers a request with this `Origin` earns.
    ///
    /// On a match the specific origin is echoed back, never a wildcard;
    /// credentials require that. On a mismatch (or no origin at all) the
    /// decision carries only a `Vary: Origin` marker.
    pub fn authorize(&self, origin: Option<&HeaderValue>) -> CorsDecision {
        let mut headers = vec![(header::VARY, HeaderValue::from_static("Origin"))];

        match origin {
            Some(origin) if *origin == self.allowed_origin => {
                headers.push((header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone()));
                if self.allow_credentials {
                    headers.push((
                        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                        HeaderValue::from_static("true"),
                    ));
                }
                CorsDecision {
                    allow: true,
                    headers,
                }
            }
            _ => CorsDecision {
                allow: false,
                headers,
            },
        }
    }
}

fn is_preflight(request: &Request<Body>) -> bool {
    *request.method() == Method::OPTIONS
        && request.headers().contains_key(header::ORIGIN)
        && request
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}

/// Middleware applying the CORS decision to every response.
pub async fn cors_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let origin = request.headers().get(header::ORIGIN).cloned();
    let decision = state.cors.authorize(origin.as_ref());

    if is_preflight(&request) {
        let requested_headers = request
            .headers()
            .get(header::ACCESS_CONTROL_REQUEST_HEADERS)
            .cloned();

        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        let headers = response.headers_mut();
        for (name, value) in &decision.headers {
            headers.append(name.clone(), value.clone());
        }
        if decision.allow {
            headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS);
            headers.insert(header::ACCESS_CONTROL_MAX_AGE, PREFLIGHT_MAX_AGE);
            if let Some(requested) = requested_headers {
                headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, requested);
            }
        }
        return response;
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    for (name, value) in &decision.headers {
        headers.append(name.clone(), value.clone());
    }
    response
}
