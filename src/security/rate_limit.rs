//! Fixed-window rate limiting per client identity.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::config::RateLimitConfig;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Message returned with every 429.
pub const RATE_LIMIT_MESSAGE: &str =
    "Too many requests from this IP, please try again later.";

/// Bucket for clients whose network identity cannot be determined.
///
/// Deliberate policy: such clients share one window rather than being
/// admitted without limit or starved outright.
const FALLBACK_IDENTITY: &str = "unidentified";

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    pub allowed: bool,
    /// Time until the identity's window resets; set only on rejection.
    pub retry_after: Option<Duration>,
}

struct Window {
    started: Instant,
    count: u32,
}

struct Buckets {
    windows: HashMap<String, Window>,
    last_sweep: Instant,
}

/// Fixed-window counter keyed by client identity.
///
/// Windows are created lazily on first sight of an identity and reset in
/// place once the window elapses. The map is mutex-guarded so concurrent
/// increments from parallel requests cannot lose updates and admit more
/// than the configured ceiling. Once per window interval, entries whose
/// window has expired are swept out so churning identities cannot grow
/// the map without bound.
pub struct FixedWindowLimiter {
    buckets: Mutex<Buckets>,
    window: Duration,
    max_requests: u32,
}

impl FixedWindowLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            buckets: Mutex::new(Buckets {
                windows: HashMap::new(),
                last_sweep: Instant::now(),
            }),
            window: Duration::from_millis(config.window_ms),
            max_requests: config.max_requests,
        }
    }

    /// Identities currently tracked.
    pub fn tracked_identities(&self) -> usize {
        self.buckets
            .lock()
            .expect("rate limiter mutex poisoned")
            .windows
            .len()
    }

    /// Count one request against `identity` at time `now`.
    pub fn admit(&self, identity: &str, now: Instant) -> Admission {
        let mut buckets = self.buckets.lock().expect("rate limiter mutex poisoned");

        if now.duration_since(buckets.last_sweep) >= self.window {
            let window = self.window;
            buckets
                .windows
                .retain(|_, w| now.duration_since(w.started) < window);
            buckets.last_sweep = now;
        }

        let window = buckets.windows.entry(identity.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= self.window {
            window.started = now;
            window.count = 0;
        }

        window.count += 1;
        if window.count > self.max_requests {
            let elapsed = now.duration_since(window.started);
            Admission {
                allowed: false,
                retry_after: Some(self.window.saturating_sub(elapsed)),
            }
        } else {
            Admission {
                allowed: true,
                retry_after: None,
            }
        }
    }
}

/// Derive the rate-limit bucket for a request.
fn client_identity(addr: Option<SocketAddr>) -> String {
    match addr {
        Some(addr) => addr.ip().to_string(),
        None => FALLBACK_IDENTITY.to_string(),
    }
}

/// Middleware enforcing the per-identity request ceiling.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let identity = client_identity(addr);
    let admission = state.limiter.admit(&identity, Instant::now());

    if admission.allowed {
        return next.run(request).await;
    }

    tracing::warn!(client = %identity, "Rate limit exceeded");
    metrics::record_rate_limited();

    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(json!({ "message": RATE_LIMIT_MESSAGE })),
    )
        .into_response();
    if let Some(retry_after) = admission.retry_after {
        let secs = retry_after.as_secs().max(1).to_string();
        if let Ok(value) = HeaderValue::from_str(&secs) {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn limiter(window_ms: u64, max_requests: u32) -> FixedWindowLimiter {
        FixedWindowLimiter::new(&RateLimitConfig {
            window_ms,
            max_requests,
        })
    }

    #[test]
    fn admits_up_to_the_ceiling_then_rejects() {
        let limiter = limiter(900_000, 3);
        let now = Instant::now();

        for _ in 0..3 {
            assert!(limiter.admit("1.2.3.4", now).allowed);
        }
        let rejected = limiter.admit("1.2.3.4", now);
        assert!(!rejected.allowed);
        assert!(rejected.retry_after.is_some());
    }

    #[test]
    fn window_rollover_admits_again() {
        let limiter = limiter(1_000, 1);
        let start = Instant::now();

        assert!(limiter.admit("1.2.3.4", start).allowed);
        assert!(!limiter.admit("1.2.3.4", start).allowed);

        let later = start + Duration::from_millis(1_000);
        assert!(limiter.admit("1.2.3.4", later).allowed);
    }

    #[test]
    fn identities_are_independent() {
        let limiter = limiter(900_000, 1);
        let now = Instant::now();

        assert!(limiter.admit("1.2.3.4", now).allowed);
        assert!(limiter.admit("5.6.7.8", now).allowed);
        assert!(!limiter.admit("1.2.3.4", now).allowed);
    }

    #[test]
    fn retry_after_counts_down_the_window() {
        let limiter = limiter(10_000, 1);
        let start = Instant::now();

        limiter.admit("1.2.3.4", start);
        let rejected = limiter.admit("1.2.3.4", start + Duration::from_millis(4_000));
        assert_eq!(rejected.retry_after, Some(Duration::from_millis(6_000)));
    }

    #[test]
    fn stale_identities_are_swept_out() {
        let limiter = limiter(1_000, 5);
        let start = Instant::now();

        limiter.admit("1.2.3.4", start);
        limiter.admit("5.6.7.8", start);
        assert_eq!(limiter.tracked_identities(), 2);

        // A full window later, the sweep drops both expired entries and
        // only the fresh identity remains tracked.
        let later = start + Duration::from_millis(1_000);
        assert!(limiter.admit("9.9.9.9", later).allowed);
        assert_eq!(limiter.tracked_identities(), 1);
    }

    #[test]
    fn missing_identity_uses_shared_fallback_bucket() {
        assert_eq!(client_identity(None), FALLBACK_IDENTITY);
        let addr: SocketAddr = "10.0.0.9:4242".parse().unwrap();
        assert_eq!(client_identity(Some(addr)), "10.0.0.9");
    }

    #[test]
    fn concurrent_admissions_never_exceed_the_ceiling() {
        let limiter = Arc::new(limiter(900_000, 50));
        let now = Instant::now();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || {
                    (0..25)
                        .filter(|_| limiter.admit("1.2.3.4", now).allowed)
                        .count()
                })
            })
            .collect();

        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 50);
    }
}
