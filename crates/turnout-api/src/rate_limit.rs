// Per-client-IP request rate limiting
//
// Sliding window over request timestamps, held in memory. Limits apply per
// IP across the whole API surface.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

const DEFAULT_MAX_REQUESTS: usize = 100;
const DEFAULT_WINDOW_SECS: u64 = 15 * 60;

#[derive(Clone)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    hits: Arc<Mutex<HashMap<IpAddr, Vec<Instant>>>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            hits: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Limits from RATE_LIMIT_MAX_REQUESTS / RATE_LIMIT_WINDOW_SECS,
    /// defaulting to 100 requests per 15 minutes
    pub fn from_env() -> Self {
        let max_requests = std::env::var("RATE_LIMIT_MAX_REQUESTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_REQUESTS);
        let window_secs = std::env::var("RATE_LIMIT_WINDOW_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_WINDOW_SECS);
        Self::new(max_requests, Duration::from_secs(window_secs))
    }

    /// Record a hit for `key`. Returns false once the key has used up its
    /// budget for the current window.
    pub fn allow(&self, key: IpAddr) -> bool {
        let now = Instant::now();
        let mut hits = self.hits.lock().unwrap_or_else(|e| e.into_inner());
        let stamps = hits.entry(key).or_default();
        stamps.retain(|t| now.duration_since(*t) < self.window);
        if stamps.len() >= self.max_requests {
            return false;
        }
        stamps.push(now);
        true
    }
}

/// Middleware layer applied to the whole router
pub async fn rate_limit(
    State(limiter): State<RateLimiter>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    if !limiter.allow(addr.ip()) {
        tracing::warn!(ip = %addr.ip(), "rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": "Too many requests from this IP, please try again later."
            })),
        )
            .into_response();
    }
    next.run(request).await
}
