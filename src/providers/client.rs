//! HTTP client shared by every adapter
//!
//! This module provides a shared HTTP client with:
//! - Per-request timeout (from provider settings, 30 seconds by default)
//! - Exponential backoff retries for transport errors, 429 and 5xx responses
//! - Translation of failures into `ProviderError`

use crate::error::ProviderError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Default timeout for search requests (30 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for connection tests (10 seconds)
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Default User-Agent header
const DEFAULT_USER_AGENT: &str = concat!("travel-providers/", env!("CARGO_PKG_VERSION"));

/// Base delay for exponential backoff (in milliseconds)
const BASE_DELAY_MS: u64 = 200;

/// HTTP client wrapper with timeout and retry policy
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
    max_retries: u32,
}

impl HttpClient {
    /// Create a new HTTP client with default settings and no retries
    pub fn new() -> Self {
        Self::with_user_agent(DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client sending the given User-Agent
    pub fn with_user_agent(user_agent: &str) -> Self {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "falling back to default HTTP client");
                Client::new()
            });

        Self {
            client,
            timeout: DEFAULT_TIMEOUT,
            max_retries: 0,
        }
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Perform a GET request and parse the JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        provider: &str,
        url: &str,
        headers: &HeaderMap,
    ) -> Result<T, ProviderError> {
        let response = self
            .execute(provider, url, || {
                self.client.get(url).headers(headers.clone())
            })
            .await?;
        Self::parse_json(provider, url, response).await
    }

    /// Perform a POST request with a JSON body and parse the JSON response
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        provider: &str,
        url: &str,
        headers: &HeaderMap,
        body: &B,
    ) -> Result<T, ProviderError> {
        let response = self
            .execute(provider, url, || {
                self.client.post(url).headers(headers.clone()).json(body)
            })
            .await?;
        Self::parse_json(provider, url, response).await
    }

    /// Single GET without retries, returning only the status code
    ///
    /// Used by connection tests, which must never outlive `timeout`.
    pub async fn probe(
        &self,
        url: &str,
        headers: &HeaderMap,
        timeout: Duration,
    ) -> Result<u16, reqwest::Error> {
        let response = self
            .client
            .get(url)
            .headers(headers.clone())
            .timeout(timeout)
            .send()
            .await?;
        Ok(response.status().as_u16())
    }

    /// Send with retry logic, returning only successful responses
    async fn execute<F>(
        &self,
        provider: &str,
        url: &str,
        build: F,
    ) -> Result<Response, ProviderError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut delay = BASE_DELAY_MS;

        for attempt in 0..=self.max_retries {
            debug!(provider, url, attempt, "sending request");
            let retries_left = attempt < self.max_retries;

            match build().timeout(self.timeout).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    let retryable = status == reqwest::StatusCode::TOO_MANY_REQUESTS
                        || status.is_server_error();
                    if retryable && retries_left {
                        warn!(provider, url, status = status.as_u16(), attempt, "retrying after error status");
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        delay *= 2;
                        continue;
                    }

                    let body = response.text().await.unwrap_or_default();
                    return Err(ProviderError::from_status(provider, status.as_u16(), &body));
                }
                Err(e) => {
                    if !retries_left {
                        return Err(ProviderError::network(provider, e));
                    }
                    warn!(provider, url, error = %e, attempt, "retrying after transport error");
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    delay *= 2;
                }
            }
        }

        // The final attempt always returns from inside the loop.
        Err(ProviderError::Operational {
            provider: provider.to_string(),
            message: "request was not attempted".to_string(),
            status: None,
            source: None,
        })
    }

    async fn parse_json<T: DeserializeOwned>(
        provider: &str,
        url: &str,
        response: Response,
    ) -> Result<T, ProviderError> {
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(provider, e))?;
        serde_json::from_str(&body).map_err(|e| ProviderError::malformed(provider, url, e))
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a header map from static lowercase names and credential values
///
/// Credentials containing characters not allowed in a header value are
/// reported as an operational error naming the header.
pub fn header_map(
    provider: &str,
    pairs: &[(&'static str, &str)],
) -> Result<HeaderMap, ProviderError> {
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        let value = HeaderValue::from_str(value).map_err(|e| ProviderError::Operational {
            provider: provider.to_string(),
            message: format!(
                "value for header '{}' contains characters not allowed in HTTP headers",
                name
            ),
            status: None,
            source: Some(Box::new(e)),
        })?;
        headers.insert(HeaderName::from_static(name), value);
    }
    Ok(headers)
}

/// Join a base URL and a path without doubling slashes
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
