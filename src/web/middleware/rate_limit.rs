//! Per-IP request rate limiting for the login endpoint.
//!
//! A coarse request throttle in front of the attempt-count lockout guard:
//! the guard bounds credential guesses, this bounds raw request volume.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::{
    collections::HashMap,
    num::NonZeroU32,
    sync::{Arc, RwLock},
    time::Duration,
};

use super::client_ip::client_ip_from_request;

/// Per-IP rate limiter using Governor.
pub type IpRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// State for login rate limiting.
#[derive(Clone)]
pub struct RateLimitState {
    /// Per-IP rate limiters for the login endpoint.
    limiters: Arc<RwLock<HashMap<String, Arc<IpRateLimiter>>>>,
    /// Login rate limit (requests per minute).
    requests_per_minute: u32,
}

impl RateLimitState {
    /// Create a new rate limit state.
    pub fn new(requests_per_minute: u32) -> Self {
        Self {
            limiters: Arc::new(RwLock::new(HashMap::new())),
            requests_per_minute,
        }
    }

    /// Get or create a rate limiter for the given IP.
    fn get_or_create_limiter(&self, ip: &str) -> Arc<IpRateLimiter> {
        // Try read lock first
        {
            let read_guard = self.limiters.read().unwrap();
            if let Some(limiter) = read_guard.get(ip) {
                return limiter.clone();
            }
        }

        let mut write_guard = self.limiters.write().unwrap();

        // Double-check after acquiring write lock
        if let Some(limiter) = write_guard.get(ip) {
            return limiter.clone();
        }

        let quota = Quota::per_minute(
            NonZeroU32::new(self.requests_per_minute).unwrap_or(NonZeroU32::MIN),
        );
        let limiter = Arc::new(RateLimiter::direct(quota));
        write_guard.insert(ip.to_string(), limiter.clone());
        limiter
    }

    /// Check if a login request is allowed for the given IP.
    pub fn check(&self, ip: &str) -> bool {
        self.get_or_create_limiter(ip).check().is_ok()
    }

    /// Cleanup limiters no longer referenced by in-flight requests.
    pub fn cleanup(&self) {
        let mut guard = self.limiters.write().unwrap();
        guard.retain(|_, v| Arc::strong_count(v) > 1);
    }

    /// Start a background task to periodically clean up old entries.
    pub fn start_cleanup_task(self: Arc<Self>) {
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(300)).await;
                self.cleanup();
            }
        });
    }
}

/// Rate limiting middleware for the login endpoint.
pub async fn login_rate_limit(
    state: Arc<RateLimitState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = client_ip_from_request(&req);

    if !state.check(&ip) {
        tracing::warn!(ip = %ip, "Login rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            "Too many login requests. Please try again later.",
        )
            .into_response();
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_allows_within_quota() {
        let state = RateLimitState::new(3);

        assert!(state.check("127.0.0.1"));
        assert!(state.check("127.0.0.1"));
        assert!(state.check("127.0.0.1"));
    }

    #[test]
    fn test_rate_limit_blocks_past_quota() {
        let state = RateLimitState::new(3);

        for _ in 0..3 {
            assert!(state.check("127.0.0.1"));
        }
        assert!(!state.check("127.0.0.1"));

        // Different IP has its own quota.
        assert!(state.check("192.168.1.1"));
    }

    #[test]
    fn test_cleanup_drops_idle_limiters() {
        let state = RateLimitState::new(3);
        state.check("127.0.0.1");

        state.cleanup();

        assert!(state.limiters.read().unwrap().is_empty());
    }
}
