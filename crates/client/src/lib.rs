//! Leasegate HTTP Client
//!
//! A native Rust client for the Leasegate lock authority. [`LeasegateClient`]
//! implements [`LockBackend`], so the locker in `leasegate-locker` runs
//! against a remote authority exactly as it runs against an in-process one.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use leasegate_client::LeasegateClient;
//! use leasegate_core::{AcquireOutcome, LockBackend, LockName, LeaseId, AcquirerId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = LeasegateClient::new("http://localhost:3000")?;
//!
//!     let name = LockName::from("deploy");
//!     let lease = LeaseId::generate();
//!     let resp = client
//!         .try_acquire(&name, &lease, &AcquirerId::generate(), Duration::from_secs(10))
//!         .await?;
//!     if resp.outcome == AcquireOutcome::Acquired {
//!         client.try_release(&name, &lease).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Retries and replay
//!
//! Each lock operation carries a fresh `request_id`. Transport failures and
//! retryable API errors are retried with the configured [`RetryStrategy`],
//! reusing that `request_id`, so the authority answers a resend of a request
//! it already applied with the original response instead of applying it
//! twice.

mod error;

pub use error::Error;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use leasegate_core::{
    AcquireRequest, AcquireResponse, AcquirerId, BackendError, LeaseId, LockBackend, LockName,
    RecordSnapshot, ReleaseRequest, ReleaseResponse, RenewRequest, RenewResponse, RetryStrategy,
    duration_to_millis,
};

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default number of attempts per logical operation, including the first.
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Error body returned by the authority.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    code: String,
    #[serde(default)]
    retryable: bool,
}

/// HTTP client for the Leasegate lock authority.
#[derive(Debug, Clone)]
pub struct LeasegateClient {
    client: Client,
    base_url: Url,
    retry: RetryStrategy,
    max_attempts: u32,
}

/// Builder for configuring a [`LeasegateClient`].
#[derive(Debug)]
pub struct LeasegateClientBuilder {
    base_url: String,
    timeout: Duration,
    retry: RetryStrategy,
    max_attempts: u32,
    client: Option<Client>,
}

impl LeasegateClientBuilder {
    /// Create a new builder with the given server URL.
    ///
    /// Only the scheme and authority are used; any path, query, or fragment
    /// is dropped.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryStrategy::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            client: None,
        }
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the delay curve between transport retries.
    #[must_use]
    pub fn retry_strategy(mut self, retry: RetryStrategy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the number of attempts per operation, including the first.
    /// `1` disables retries.
    #[must_use]
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Use a custom reqwest Client.
    ///
    /// Useful for configuring TLS, proxies, or other advanced settings. The
    /// builder's timeout is ignored in that case.
    #[must_use]
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<LeasegateClient, Error> {
        if self.max_attempts == 0 {
            return Err(Error::Configuration(
                "max_attempts must be at least 1".into(),
            ));
        }
        let base_url = origin_of(&self.base_url)?;
        let client = match self.client {
            Some(c) => c,
            None => Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(|e| Error::Configuration(e.to_string()))?,
        };

        Ok(LeasegateClient {
            client,
            base_url,
            retry: self.retry,
            max_attempts: self.max_attempts,
        })
    }
}

/// Reduce `raw` to `scheme://host[:port]`.
fn origin_of(raw: &str) -> Result<Url, Error> {
    let url = Url::parse(raw.trim())
        .map_err(|e| Error::Configuration(format!("invalid server URL {raw:?}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Configuration(format!(
            "unsupported scheme {:?} in server URL {raw:?}",
            url.scheme()
        )));
    }
    let origin = url.origin().ascii_serialization();
    Url::parse(&origin)
        .map_err(|e| Error::Configuration(format!("invalid server URL {raw:?}: {e}")))
}

fn new_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl LeasegateClient {
    /// Create a new client with default configuration.
    pub fn new(base_url: impl Into<String>) -> Result<Self, Error> {
        LeasegateClientBuilder::new(base_url).build()
    }

    /// Create a builder for advanced configuration.
    pub fn builder(base_url: impl Into<String>) -> LeasegateClientBuilder {
        LeasegateClientBuilder::new(base_url)
    }

    /// The server origin requests are sent to.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Check if the server is healthy.
    pub async fn health(&self) -> Result<bool, Error> {
        let url = self.url(&["health"])?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        Ok(response.status().is_success())
    }

    /// Current record of one lock, or `None` if it was never taken.
    pub async fn inspect(&self, name: &LockName) -> Result<Option<RecordSnapshot>, Error> {
        let url = self.lock_url(name, None)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::decode(response).await.map(Some)
    }

    /// Every lock ever taken, sorted by name.
    pub async fn list(&self) -> Result<Vec<RecordSnapshot>, Error> {
        let url = self.url(&["v1", "locks"])?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        Self::decode(response).await
    }

    /// One acquisition attempt.
    pub async fn acquire(
        &self,
        name: &LockName,
        lease_id: &LeaseId,
        acquirer_id: &AcquirerId,
        ttl: Duration,
    ) -> Result<AcquireResponse, Error> {
        let body = AcquireRequest {
            lease_id: lease_id.clone(),
            acquirer_id: acquirer_id.clone(),
            ttl_ms: duration_to_millis(ttl),
            request_id: Some(new_request_id()),
        };
        self.post_with_retry(name, "acquire", &body).await
    }

    /// One renewal attempt.
    pub async fn renew(
        &self,
        name: &LockName,
        lease_id: &LeaseId,
        ttl: Duration,
    ) -> Result<RenewResponse, Error> {
        let body = RenewRequest {
            lease_id: lease_id.clone(),
            ttl_ms: duration_to_millis(ttl),
            request_id: Some(new_request_id()),
        };
        self.post_with_retry(name, "renew", &body).await
    }

    /// One release attempt.
    pub async fn release(
        &self,
        name: &LockName,
        lease_id: &LeaseId,
    ) -> Result<ReleaseResponse, Error> {
        let body = ReleaseRequest {
            lease_id: lease_id.clone(),
            request_id: Some(new_request_id()),
        };
        self.post_with_retry(name, "release", &body).await
    }

    fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::Configuration(format!("{} cannot be a base URL", self.base_url)))?
            .clear()
            .extend(segments);
        Ok(url)
    }

    /// `/v1/locks/{name}[/{action}]`. Names are checked first, since the
    /// URL path would silently drop a `.` or `..` segment.
    fn lock_url(&self, name: &LockName, action: Option<&str>) -> Result<Url, Error> {
        name.validate().map_err(|e| match e {
            BackendError::InvalidRequest(message) => Error::InvalidRequest(message),
            other => Error::InvalidRequest(other.to_string()),
        })?;
        let mut segments = vec!["v1", "locks", name.as_str()];
        segments.extend(action);
        self.url(&segments)
    }

    /// POST `body` to `/v1/locks/{name}/{action}`, retrying retryable
    /// failures with the same body (and so the same `request_id`).
    async fn post_with_retry<B, R>(&self, name: &LockName, action: &str, body: &B) -> Result<R, Error>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.lock_url(name, Some(action))?;
        let mut attempt = 0;
        loop {
            match self.post_once(url.clone(), body).await {
                Ok(resp) => return Ok(resp),
                Err(e) if e.is_retryable() && attempt + 1 < self.max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        lock = %name,
                        action,
                        attempt,
                        error = %e,
                        delay_ms = delay.as_millis(),
                        "request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    debug!(lock = %name, action, attempt, error = %e, "request failed");
                    return Err(e);
                }
            }
        }
    }

    async fn post_once<B, R>(&self, url: Url, body: &B) -> Result<R, Error>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        Self::decode(response).await
    }

    async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, Error> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<R>()
                .await
                .map_err(|e| Error::Deserialization(e.to_string()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => Err(Error::Api {
                code: body.code,
                message: body.error,
                retryable: body.retryable,
            }),
            Err(_) => Err(Error::Http {
                status: status.as_u16(),
                message: if text.is_empty() {
                    status.canonical_reason().unwrap_or("unknown").to_owned()
                } else {
                    text
                },
            }),
        }
    }
}

#[async_trait]
impl LockBackend for LeasegateClient {
    async fn try_acquire(
        &self,
        name: &LockName,
        lease_id: &LeaseId,
        acquirer_id: &AcquirerId,
        ttl: Duration,
    ) -> Result<AcquireResponse, BackendError> {
        Ok(self.acquire(name, lease_id, acquirer_id, ttl).await?)
    }

    async fn try_renew(
        &self,
        name: &LockName,
        lease_id: &LeaseId,
        ttl: Duration,
    ) -> Result<RenewResponse, BackendError> {
        Ok(self.renew(name, lease_id, ttl).await?)
    }

    async fn try_release(
        &self,
        name: &LockName,
        lease_id: &LeaseId,
    ) -> Result<ReleaseResponse, BackendError> {
        Ok(self.release(name, lease_id).await?)
    }
}
