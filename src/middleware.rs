//! Middleware composed into every request sent to the server

use crate::config::ConfigStore;

use async_trait::async_trait;
use http::Extensions;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next};
use tokio::sync::Mutex;
use tokio::time::{self, Duration, Instant};

use std::sync::Arc;

/// Sets `Authorization` to `stored` unless the request already carries one.
///
/// Requests that bring their own header (the credential test does) are left untouched. An empty
/// `stored` value inserts nothing.
pub fn apply_stored_authorization(headers: &mut HeaderMap, stored: &str) {
    if headers.contains_key(AUTHORIZATION) || stored.is_empty() {
        return;
    }

    match HeaderValue::from_str(stored) {
        Ok(mut value) => {
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        Err(e) => tracing::warn!("stored authorization is not a valid header value: {e}"),
    }
}

/// Request extension that keeps [AuthInterceptor] from adding the stored header.
///
/// Carried by calls made against an address that has not been saved yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithoutStoredAuthorization;

/// Injects the stored authorization header
#[derive(Debug, Clone)]
pub struct AuthInterceptor {
    config: Arc<ConfigStore>,
}

impl AuthInterceptor {
    pub fn new(config: Arc<ConfigStore>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Middleware for AuthInterceptor {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        if extensions.get::<WithoutStoredAuthorization>().is_none() {
            apply_stored_authorization(req.headers_mut(), &self.config.auth_header());
        }

        next.run(req, extensions).await
    }
}

/// Spaces requests evenly so that at most `requests_per_second` leave per second
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    next_slot: Mutex<Instant>,
}

impl RateLimiter {
    /// `0` disables limiting
    pub fn per_second(requests_per_second: u32) -> Self {
        let interval = if requests_per_second == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(1) / requests_per_second
        };

        Self {
            interval,
            next_slot: Mutex::new(Instant::now()),
        }
    }

    /// Waits for the next free slot
    pub async fn acquire(&self) {
        if self.interval.is_zero() {
            return;
        }

        let slot = {
            let mut next_slot = self.next_slot.lock().await;
            let slot = (*next_slot).max(Instant::now());
            *next_slot = slot + self.interval;

            slot
        };

        time::sleep_until(slot).await;
    }
}

#[async_trait]
impl Middleware for RateLimiter {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        self.acquire().await;

        next.run(req, extensions).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn injects_stored_header_when_absent() {
        let mut headers = HeaderMap::new();
        apply_stored_authorization(&mut headers, "Bearer stored");

        assert_eq!(headers[AUTHORIZATION], "Bearer stored");
    }

    #[test]
    fn keeps_existing_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic trial"));

        apply_stored_authorization(&mut headers, "Bearer stored");

        assert_eq!(headers[AUTHORIZATION], "Basic trial");
        assert_eq!(headers.get_all(AUTHORIZATION).iter().count(), 1);
    }

    #[test]
    fn empty_stored_header_inserts_nothing() {
        let mut headers = HeaderMap::new();
        apply_stored_authorization(&mut headers, "");

        assert!(!headers.contains_key(AUTHORIZATION));
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limiter_spaces_requests() {
        let limiter = RateLimiter::per_second(4);
        let start = Instant::now();

        for _ in 0..5 {
            limiter.acquire().await;
        }

        // first slot is immediate, the other four are 250ms apart
        assert!(start.elapsed() >= Duration::from_secs(1));
        assert!(start.elapsed() < Duration::from_millis(1100));
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_rate_limiter_does_not_wait() {
        let limiter = RateLimiter::per_second(0);
        let start = Instant::now();

        for _ in 0..10 {
            limiter.acquire().await;
        }

        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
