//! # Mock Cinema API
//!
//! An in-process HTTP server that stands in for a cinema chain's web API.
//! Routes are matched on the exact path and query string, and every request
//! is recorded with its headers so tests can assert which pages were fetched
//! and what the client sent.

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use lib_cinema::cinemas::{ApiCall, MovieTracker};
use lib_cinema::loggers::loggerlocal::{LoggerLocal, LoggerLocalOptions};
use lib_cinema::retrieve::ky_http::{ApiClient, ApiClientOptions};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

#[derive(Clone, Default)]
struct Shared {
    routes: Arc<HashMap<String, (u16, String)>>,
    requests: Arc<Mutex<Vec<ReceivedRequest>>>,
}

/// One request as seen by the mock server.
#[derive(Clone, Debug)]
pub struct ReceivedRequest {
    pub path_and_query: String,
    pub headers: HeaderMap,
}

/// Route table for a mock cinema API.
#[derive(Default)]
pub struct MockCinemaApi {
    routes: HashMap<String, (u16, String)>,
}

impl MockCinemaApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` as JSON with status 200 at `path_and_query` (e.g. `/movies?locality=brisbane`).
    pub fn json(self, path_and_query: &str, body: Value) -> Self {
        self.raw(path_and_query, 200, &body.to_string())
    }

    /// Serves `body` verbatim with `status` at `path_and_query`.
    pub fn raw(mut self, path_and_query: &str, status: u16, body: &str) -> Self {
        self.routes
            .insert(path_and_query.to_string(), (status, body.to_string()));
        self
    }

    /// Binds to an ephemeral local port and starts serving.
    pub async fn start(self) -> MockServer {
        let shared = Shared {
            routes: Arc::new(self.routes),
            requests: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new().fallback(serve).with_state(shared.clone());
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock cinema api");
        let addr = listener.local_addr().expect("mock cinema api address");

        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        MockServer {
            base_url: format!("http://{}", addr),
            requests: shared.requests,
            task,
        }
    }
}

async fn serve(State(shared): State<Shared>, uri: Uri, headers: HeaderMap) -> Response {
    let key = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    if let Ok(mut requests) = shared.requests.lock() {
        requests.push(ReceivedRequest {
            path_and_query: key.clone(),
            headers,
        });
    }

    match shared.routes.get(&key) {
        Some((status, body)) => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            [(header::CONTENT_TYPE, "application/json")],
            body.clone(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "<html>no such route</html>").into_response(),
    }
}

/// A running mock API. The server stops when this is dropped.
pub struct MockServer {
    base_url: String,
    requests: Arc<Mutex<Vec<ReceivedRequest>>>,
    task: JoinHandle<()>,
}

impl MockServer {
    /// Absolute URL for `path_and_query` on this server.
    pub fn url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base_url, path_and_query)
    }

    /// Every path and query received so far, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.received()
            .into_iter()
            .map(|r| r.path_and_query)
            .collect()
    }

    /// Every request received so far, headers included.
    pub fn received(&self) -> Vec<ReceivedRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Value of header `name` on each request, in arrival order.
    pub fn header_values(&self, name: &str) -> Vec<Option<String>> {
        self.received()
            .iter()
            .map(|r| {
                r.headers
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            })
            .collect()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// A logger that only keeps records in memory.
pub fn memory_logger() -> Arc<LoggerLocal> {
    Arc::new(LoggerLocal::new(
        "project_tests".to_string(),
        Some(LoggerLocalOptions::memory_only()),
    ))
}

/// Client options suited to a local mock: short timeout, no retries.
pub fn test_client_options() -> ApiClientOptions {
    ApiClientOptions {
        timeout: Duration::from_secs(5),
        ..Default::default()
    }
}

pub fn api_client(logger: &Arc<LoggerLocal>) -> ApiClient {
    ApiClient::new(test_client_options(), Arc::clone(logger)).expect("build api client")
}

/// A `MovieTracker` wired to `logger`.
pub fn tracker(logger: &Arc<LoggerLocal>) -> MovieTracker {
    tracker_with(test_client_options(), logger)
}

/// A `MovieTracker` built from explicit client `options`.
pub fn tracker_with(options: ApiClientOptions, logger: &Arc<LoggerLocal>) -> MovieTracker {
    let api_call = ApiCall::with_options(options, Arc::clone(logger)).expect("build api call");
    MovieTracker::new(Arc::new(api_call), Arc::clone(logger))
}
