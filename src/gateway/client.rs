//! Shared outbound client for calls to the data service.
//!
//! # Responsibilities
//! - Hold one pooled `reqwest::Client` for the whole process
//! - Apply the per-attempt timeout and the retry policy
//! - Forward the correlation id as `X-Request-ID`
//! - Classify failures into `UpstreamError`

use std::time::Duration;

use axum::http::{Method, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::config::{GatewayConfig, RetryConfig};
use crate::http::request::{RequestId, X_REQUEST_ID};
use crate::observability::metrics;
use crate::resilience::RetryPolicy;

/// Why a call to the data service did not produce a usable body.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("data service did not respond in time")]
    Timeout,

    #[error("could not connect to data service: {0}")]
    Unavailable(String),

    #[error("data service returned {0}")]
    Status(StatusCode),

    #[error("unexpected failure calling data service: {0}")]
    Other(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        // Connect timeouts report both flags; they count as timeouts.
        if err.is_timeout() {
            UpstreamError::Timeout
        } else if err.is_connect() {
            UpstreamError::Unavailable(err.to_string())
        } else if let Some(status) = err.status() {
            UpstreamError::Status(status)
        } else {
            UpstreamError::Other(err.to_string())
        }
    }
}

/// Errors building the client at startup.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Retrying JSON client bound to one data service base URL.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    policy: RetryPolicy,
    request_timeout: Duration,
    ready_timeout: Duration,
}

impl BackendClient {
    pub fn new(config: &GatewayConfig, retries: &RetryConfig) -> Result<Self, ClientBuildError> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .no_proxy()
            .build()?;

        Ok(Self {
            http,
            base_url: config.backend_base_url.trim_end_matches('/').to_string(),
            policy: RetryPolicy::from_config(retries),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            ready_timeout: Duration::from_secs(config.ready_timeout_secs),
        })
    }

    /// Override the per-attempt timeout for data calls.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Override the readiness probe timeout.
    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET `path` and decode the JSON body, retrying transient statuses.
    pub async fn get_json(&self, path: &str, request_id: &RequestId) -> Result<Value, UpstreamError> {
        let url = self.url(path);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let response = self
                .http
                .get(&url)
                .header(X_REQUEST_ID, request_id.as_str())
                .timeout(self.request_timeout)
                .send()
                .await?;

            let status = response.status();
            if self.policy.should_retry(&Method::GET, status, attempt) {
                let delay = self.policy.backoff(attempt);
                tracing::warn!(
                    request_id = %request_id,
                    path,
                    attempt,
                    status = %status,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "Retrying data service call"
                );
                metrics::record_retry(path);
                tokio::time::sleep(delay).await;
                continue;
            }

            if status.is_client_error() || status.is_server_error() {
                return Err(UpstreamError::Status(status));
            }

            return Ok(response.json::<Value>().await?);
        }
    }

    /// Single-attempt GET of the data service `/health`, returning its status.
    pub async fn probe_health(&self, request_id: &RequestId) -> Result<StatusCode, UpstreamError> {
        let response = self
            .http
            .get(self.url("/health"))
            .header(X_REQUEST_ID, request_id.as_str())
            .timeout(self.ready_timeout)
            .send()
            .await?;
        Ok(response.status())
    }
}
