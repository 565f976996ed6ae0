//! # Cinema API Client
//!
//! Turns an endpoint into decoded JSON. Transport errors and bodies that are
//! not JSON both degrade to an empty mapping plus one error line, so the
//! tracker above never has to branch on *why* a response is unusable.

use crate::loggers::loggerlocal::LoggerLocal;
use crate::retrieve::ky_http::{ApiClient, ApiClientOptions, ApiResponse};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Logged once for every request that produced no decodable JSON.
pub const NO_JSON_RESPONSE: &str = "Received no JSON response from request.";

/// # Cinema API Call Client
///
/// Wraps an `ApiClient` and a shared `LoggerLocal`.
pub struct ApiCall {
    client: ApiClient,
    logger: Arc<LoggerLocal>,
}

impl ApiCall {
    pub fn new(client: ApiClient, logger: Arc<LoggerLocal>) -> Self {
        Self { client, logger }
    }

    /// Builds the underlying `ApiClient` from `options` with the same logger.
    pub fn with_options(options: ApiClientOptions, logger: Arc<LoggerLocal>) -> anyhow::Result<Self> {
        let client = ApiClient::new(options, Arc::clone(&logger))?;
        Ok(Self::new(client, logger))
    }

    /// A single GET with no per-request headers.
    pub async fn make_request(&self, url: &str) -> anyhow::Result<ApiResponse> {
        self.client.get(url, None).await
    }

    /// # Get JSON Response
    ///
    /// Requests `endpoint` and decodes the body as JSON.
    ///
    /// Returns an empty mapping (`{}`) when the request could not be made or the
    /// body is not JSON; in both cases exactly one error is logged. No retry.
    pub async fn get_json_response(&self, endpoint: &str) -> Value {
        let response = match self.make_request(endpoint).await {
            Ok(response) => response,
            Err(e) => {
                self.logger.error(
                    NO_JSON_RESPONSE,
                    Some(json!({"endpoint": endpoint, "reason": e.to_string()})),
                );
                return Value::Object(Map::new());
            }
        };

        match response.json::<Value>() {
            Ok(body) => {
                self.logger.debug(
                    "Decoded JSON response",
                    Some(json!({"endpoint": endpoint, "status": response.status})),
                );
                body
            }
            Err(e) => {
                self.logger.error(
                    NO_JSON_RESPONSE,
                    Some(json!({
                        "endpoint": endpoint,
                        "status": response.status,
                        "reason": e.to_string()
                    })),
                );
                Value::Object(Map::new())
            }
        }
    }
}
