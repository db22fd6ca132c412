#![allow(dead_code)]

use kavita_source::config::{AuthScheme, ConfigStore, ServerSettings};
use kavita_source::host::MemoryStore;
use kavita_source::source::KavitaSource;
use kavita_source::{KavitaClient, RequestPolicy};

use async_trait::async_trait;
use http::Extensions;
use parking_lot::Mutex;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, Request, Response, StatusCode, Url};
use reqwest_middleware::{Middleware, Next};
use serde_json::{json, Value};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const SERVER_ADDRESS: &str = "http://kavita.test";
pub const API_BASE: &str = "http://kavita.test/api/";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: Url,
    pub authorization: Option<String>,
}

impl RecordedRequest {
    pub fn param(&self, key: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    pub fn params(&self, key: &str) -> Vec<String> {
        self.url
            .query_pairs()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
            .collect()
    }
}

#[derive(Debug)]
struct Route {
    path: String,
    params: Vec<(String, String)>,
    status: StatusCode,
    body: Value,
}

/// Answers requests with canned responses instead of sending them
#[derive(Debug, Default)]
pub struct StubServer {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<RecordedRequest>>,
    delays: Mutex<Vec<(String, Duration)>>,
    offline: AtomicBool,
}

impl StubServer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Responds to `path` (below the host, e.g. `/api/Series`) when every pair of `params` is
    /// present in the query. Earlier routes win.
    pub fn route(&self, path: &str, params: &[(&str, &str)], body: Value) {
        self.route_with_status(path, params, StatusCode::OK, body);
    }

    pub fn route_with_status(
        &self,
        path: &str,
        params: &[(&str, &str)],
        status: StatusCode,
        body: Value,
    ) {
        self.routes.lock().push(Route {
            path: path.to_owned(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            status,
            body,
        });
    }

    /// Holds back every response to `path` for `delay`
    pub fn delay(&self, path: &str, delay: Duration) {
        self.delays.lock().push((path.to_owned(), delay));
    }

    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn respond(&self, url: &Url) -> (StatusCode, Value) {
        let routes = self.routes.lock();

        let route = routes.iter().find(|route| {
            route.path == url.path()
                && route
                    .params
                    .iter()
                    .all(|(k, v)| url.query_pairs().any(|(qk, qv)| qk == *k && qv == *v))
        });

        match route {
            Some(route) => (route.status, route.body.clone()),
            None => (StatusCode::NOT_FOUND, json!({})),
        }
    }
}

#[async_trait]
impl Middleware for StubServer {
    async fn handle(
        &self,
        req: Request,
        _extensions: &mut Extensions,
        _next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        self.requests.lock().push(RecordedRequest {
            method: req.method().clone(),
            url: req.url().clone(),
            authorization: req
                .headers()
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned),
        });

        let delay = self
            .delays
            .lock()
            .iter()
            .find(|(path, _)| path == req.url().path())
            .map(|(_, delay)| *delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.offline.load(Ordering::SeqCst) {
            return Err(reqwest_middleware::Error::middleware(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )));
        }

        let (status, body) = self.respond(req.url());
        let resp = http::Response::builder()
            .status(status)
            .header("content-type", "application/json")
            .body(body.to_string())
            .expect("valid stub response");

        Ok(Response::from(resp))
    }
}

pub fn source(scheme: AuthScheme, server: &Arc<StubServer>) -> KavitaSource {
    let config = ConfigStore::new(
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryStore::new()),
        scheme,
    );

    let client = KavitaClient::builder()
        .config(Arc::new(config))
        .policy(RequestPolicy {
            requests_per_second: 0,
            ..Default::default()
        })
        .middleware(vec![server.clone() as Arc<dyn Middleware>])
        .build()
        .expect("client builds");

    KavitaSource::new(client)
}

pub fn settings() -> ServerSettings {
    ServerSettings {
        server_address: SERVER_ADDRESS.to_owned(),
        username: "reader".to_owned(),
        password: "hunter2".to_owned(),
        show_on_deck: true,
        show_recently_updated: true,
        ..Default::default()
    }
}

/// Source with Basic credentials stored, submitting them sends no request
pub async fn logged_in_source(server: &Arc<StubServer>) -> KavitaSource {
    let source = source(AuthScheme::Basic, server);
    source
        .submit_settings(&settings())
        .await
        .expect("basic settings store without network");

    source
}

pub fn series_json(id: &str, name: &str, last_modified: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "lastModified": last_modified,
        "metadata": {
            "summary": format!("About {name}"),
            "status": "ONGOING",
            "language": "en"
        }
    })
}

pub fn listing(items: Vec<Value>) -> Value {
    json!({ "content": items })
}
