//! # HTTP Retrieval Utilities
//!
//! This module provides an asynchronous GET client wrapper around `reqwest`.
//! A request is issued once, its status is checked and the raw body is handed
//! back to the caller, whatever the status code was.

use crate::loggers::loggerlocal::LoggerLocal;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Raw result of a GET request.
///
/// Holds the status, headers and undecoded body. Decoding is left to the caller.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// The numeric HTTP status code.
    pub status: u16,
    /// Indicates if the status code was in the 2xx range.
    pub success: bool,
    /// The headers returned by the server.
    pub headers: HeaderMap,
    /// The response body as text.
    pub body: String,
}

impl ApiResponse {
    /// Decodes the body as JSON into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Construction options for `ApiClient`.
#[derive(Debug, Clone)]
pub struct ApiClientOptions {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
    /// Transient-failure retries. `0` attaches no retry middleware at all.
    pub max_retries: u32,
    /// Headers sent with every request, before per-request headers.
    pub default_headers: BTreeMap<String, String>,
}

impl Default for ApiClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("palace-tracker/{}", env!("CARGO_PKG_VERSION")),
            max_retries: 0,
            default_headers: BTreeMap::new(),
        }
    }
}

/// A GET-only asynchronous HTTP client.
///
/// Built on top of `reqwest_middleware`; logs non-200 responses through the
/// shared `LoggerLocal` instead of failing on them.
pub struct ApiClient {
    /// The underlying middleware-enabled client.
    inner: ClientWithMiddleware,
    /// Shared logger for transport warnings.
    logger: Arc<LoggerLocal>,
}

impl ApiClient {
    /// Creates a new `ApiClient`.
    ///
    /// # Errors
    /// Returns an error if a default header is not a valid HTTP header or the
    /// TLS backend cannot be initialised.
    pub fn new(options: ApiClientOptions, logger: Arc<LoggerLocal>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent.as_str())
            .default_headers(to_header_map(&options.default_headers)?)
            .build()?;

        let mut builder = ClientBuilder::new(client);
        if options.max_retries > 0 {
            let retry_policy = ExponentialBackoff::builder().build_with_max_retries(options.max_retries);
            builder = builder.with(RetryTransientMiddleware::new_with_policy(retry_policy));
        }

        Ok(Self {
            inner: builder.build(),
            logger,
        })
    }

    /// Issues a single GET to `url`.
    ///
    /// `headers` defaults to none. A status other than 200 is logged as a
    /// warning naming the URL, and the response is returned regardless.
    ///
    /// # Errors
    /// Returns an error only when no response was received at all
    /// (invalid URL, DNS, connection or timeout failures).
    pub async fn get(&self, url: &str, headers: Option<HeaderMap>) -> anyhow::Result<ApiResponse> {
        let full_url = Url::parse(url)?;
        let mut req = self.inner.get(full_url);

        if let Some(h) = headers {
            req = req.headers(h);
        }

        let response: reqwest::Response = req.send().await?;
        let status = response.status();
        let resp_headers = response.headers().clone();

        if status != StatusCode::OK {
            self.logger.warn(
                &format!("Could not resolve request to '{}'.", url),
                Some(json!({"url": url, "status": status.as_u16()})),
            );
        }

        let body = response.text().await?;
        Ok(ApiResponse {
            status: status.as_u16(),
            success: status.is_success(),
            headers: resp_headers,
            body,
        })
    }
}

/// Converts a plain name/value map into a `HeaderMap`.
pub fn to_header_map(headers: &BTreeMap<String, String>) -> anyhow::Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let h_name = HeaderName::from_bytes(name.as_bytes())?;
        let h_value = HeaderValue::from_str(value)?;
        map.insert(h_name, h_value);
    }
    Ok(map)
}
