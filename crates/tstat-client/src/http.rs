//! HTTP seam to the configuration API.
//!
//! The session talks to the backend through [`HttpClient`] so tests and
//! alternative transports can stand in for [`ReqwestHttpClient`].

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::errors::{RequestError, excerpt};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// A completed HTTP exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body text.
    pub body: String,
}

impl HttpResponse {
    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into [`RequestError::Status`].
    pub fn error_for_status(self) -> Result<Self, RequestError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(RequestError::Status {
                status: self.status,
                body: self.body,
            })
        }
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, RequestError> {
        serde_json::from_str(&self.body).map_err(|e| RequestError::Decode {
            message: format!("{e} in '{}'", excerpt(&self.body, 80)),
        })
    }
}

/// Minimal request/response client for the configuration API.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issue a GET.
    async fn get(&self, url: &str) -> Result<HttpResponse, RequestError>;

    /// Issue a PUT with a JSON body.
    async fn put_json(&self, url: &str, body: &Value) -> Result<HttpResponse, RequestError>;
}

/// [`HttpClient`] backed by `reqwest`, with a bounded per-request timeout.
pub struct ReqwestHttpClient {
    client: reqwest::Client,
    timeout_ms: u64,
}

impl ReqwestHttpClient {
    /// Create a client with the default timeout.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS))
    }

    /// Create a client whose requests fail after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tstat/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                warn!(
                    error = %e,
                    timeout_ms,
                    "HTTP client build failed, falling back without timeout"
                );
                reqwest::Client::default()
            });
        Self { client, timeout_ms }
    }

    fn map_error(&self, err: &reqwest::Error) -> RequestError {
        if err.is_timeout() {
            RequestError::Timeout {
                timeout_ms: self.timeout_ms,
            }
        } else {
            RequestError::Transport {
                message: err.to_string(),
            }
        }
    }

    async fn finish(&self, response: reqwest::Response) -> Result<HttpResponse, RequestError> {
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.map_error(&e))?;
        Ok(HttpResponse { status, body })
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, RequestError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_error(&e))?;
        self.finish(response).await
    }

    async fn put_json(&self, url: &str, body: &Value) -> Result<HttpResponse, RequestError> {
        let response = self
            .client
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_error(&e))?;
        self.finish(response).await
    }
}
