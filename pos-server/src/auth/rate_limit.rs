//! Per-IP rate limiting for login and registration

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::{AppError, ErrorCode};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::state::AppState;

const LOGIN_MAX_ATTEMPTS: u32 = 5;
const REGISTER_MAX_ATTEMPTS: u32 = 3;
const WINDOW: Duration = Duration::from_secs(60);
const ENTRY_TTL: Duration = Duration::from_secs(300);

struct Window {
    count: u32,
    started: Instant,
}

#[derive(Clone, Default)]
pub struct RateLimiter {
    /// route -> (IP -> window)
    inner: Arc<Mutex<HashMap<&'static str, HashMap<String, Window>>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when the request is allowed
    pub async fn check(&self, route: &'static str, ip: &str, max_requests: u32, window: Duration) -> bool {
        let mut routes = self.inner.lock().await;
        let now = Instant::now();
        let entry = routes
            .entry(route)
            .or_default()
            .entry(ip.to_owned())
            .or_insert(Window {
                count: 0,
                started: now,
            });

        if now.duration_since(entry.started) >= window {
            entry.count = 0;
            entry.started = now;
        }

        entry.count += 1;
        entry.count <= max_requests
    }

    /// Drop windows idle for more than five minutes
    pub async fn cleanup(&self) {
        let mut routes = self.inner.lock().await;
        let now = Instant::now();
        for ips in routes.values_mut() {
            ips.retain(|_, w| now.duration_since(w.started) < ENTRY_TTL);
        }
        routes.retain(|_, ips| !ips.is_empty());
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.inner.lock().await.values().map(HashMap::len).sum()
    }
}

/// X-Forwarded-For first (reverse proxy), then the peer address
fn client_ip(request: &Request) -> String {
    if let Some(forwarded) = request.headers().get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
        && let Some(first) = val.split(',').next()
    {
        let ip = first.trim();
        if !ip.is_empty() {
            return ip.to_owned();
        }
    }

    request
        .extensions()
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

async fn limit(
    state: &AppState,
    route: &'static str,
    max_requests: u32,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = client_ip(&request);
    if !state.rate_limiter.check(route, &ip, max_requests, WINDOW).await {
        tracing::warn!(route, ip = %ip, "Rate limit exceeded");
        return Err(AppError::new(ErrorCode::TooManyAttempts));
    }
    Ok(next.run(request).await)
}

/// 5 requests/minute per IP
pub async fn login_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    limit(&state, "login", LOGIN_MAX_ATTEMPTS, request, next).await
}

/// 3 requests/minute per IP
pub async fn register_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    limit(&state, "register", REGISTER_MAX_ATTEMPTS, request, next).await
}
