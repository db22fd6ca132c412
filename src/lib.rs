//! Content source for manga reading hosts backed by a self-hosted Kavita server.
//!
//! [`KavitaSource`](source::KavitaSource) exposes the operations the host calls (search, facets,
//! details, chapters, pages, home sections, update polls and settings). They are built on
//! [`KavitaClient`], which talks to the server's REST API.

pub mod config;
pub mod home;
pub mod host;
pub mod middleware;
pub mod requests;
pub mod settings;
pub mod source;
pub mod updates;

use config::ConfigStore;
use middleware::{AuthInterceptor, RateLimiter};
use requests::Result;

use bon::bon;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, Middleware};
use reqwest_tracing::TracingMiddleware;

use std::sync::Arc;
use std::time::Duration;

/// Scheduling limits applied to every request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestPolicy {
    pub requests_per_second: u32,
    pub timeout: Duration,
}

impl Default for RequestPolicy {
    fn default() -> Self {
        Self {
            requests_per_second: 4,
            timeout: Duration::from_secs(20),
        }
    }
}

/// Http client for the Kavita REST API.
///
/// Every request goes through tracing, the stored authorization and the rate limiter, in that
/// order. Requests are attempted once, there is no retry layer.
#[derive(Clone, Debug)]
pub struct KavitaClient {
    client: ClientWithMiddleware,
    config: Arc<ConfigStore>,
}

#[bon]
impl KavitaClient {
    pub const USER_AGENT: &'static str = concat!("kavita-source/", env!("CARGO_PKG_VERSION"));

    /// `middleware` is appended after the built-in layers
    #[builder]
    pub fn new(
        config: Arc<ConfigStore>,
        #[builder(default)] policy: RequestPolicy,
        #[builder(default)] middleware: Vec<Arc<dyn Middleware>>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(Self::USER_AGENT)
            .timeout(policy.timeout)
            .build()?;

        let mut builder = ClientBuilder::new(client)
            .with(TracingMiddleware::default())
            .with(AuthInterceptor::new(Arc::clone(&config)))
            .with(RateLimiter::per_second(policy.requests_per_second));
        for layer in middleware {
            builder = builder.with_arc(layer);
        }

        Ok(Self {
            client: builder.build(),
            config,
        })
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }
}
