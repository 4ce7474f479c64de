//! Replay cache for mutating lock requests.
//!
//! A client that retries a request after a transport failure cannot tell
//! whether the first attempt reached the authority. Requests may carry a
//! client-generated `request_id`; the first response for a given
//! `(operation, name, request_id)` is cached and returned to every resend,
//! so a retried acquire never turns into a second write. Concurrent
//! resends of an in-flight request share its single execution.

use std::future::Future;
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use leasegate_core::{AcquireResponse, BackendError, LockName, ReleaseResponse, RenewResponse};

use crate::config::ReplayConfig;

/// Longest `request_id` accepted, in bytes.
pub const MAX_REQUEST_ID_LEN: usize = 128;

/// The mutating operation a cached response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Acquire,
    Renew,
    Release,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ReplayKey {
    operation: Operation,
    name: LockName,
    request_id: String,
}

/// A response held by the replay cache.
#[derive(Debug, Clone)]
pub enum CachedResponse {
    Acquire(AcquireResponse),
    Renew(RenewResponse),
    Release(ReleaseResponse),
}

/// A response type that can be stored in the replay cache.
pub trait Replayable: Sized {
    const OPERATION: Operation;

    fn into_cached(self) -> CachedResponse;

    fn from_cached(cached: CachedResponse) -> Option<Self>;
}

impl Replayable for AcquireResponse {
    const OPERATION: Operation = Operation::Acquire;

    fn into_cached(self) -> CachedResponse {
        CachedResponse::Acquire(self)
    }

    fn from_cached(cached: CachedResponse) -> Option<Self> {
        match cached {
            CachedResponse::Acquire(r) => Some(r),
            _ => None,
        }
    }
}

impl Replayable for RenewResponse {
    const OPERATION: Operation = Operation::Renew;

    fn into_cached(self) -> CachedResponse {
        CachedResponse::Renew(self)
    }

    fn from_cached(cached: CachedResponse) -> Option<Self> {
        match cached {
            CachedResponse::Renew(r) => Some(r),
            _ => None,
        }
    }
}

impl Replayable for ReleaseResponse {
    const OPERATION: Operation = Operation::Release;

    fn into_cached(self) -> CachedResponse {
        CachedResponse::Release(self)
    }

    fn from_cached(cached: CachedResponse) -> Option<Self> {
        match cached {
            CachedResponse::Release(r) => Some(r),
            _ => None,
        }
    }
}

/// Bounded, time-limited map of `(operation, name, request_id)` to the
/// response first produced for it. Errors are never cached.
#[derive(Clone)]
pub struct ReplayCache {
    cache: Cache<ReplayKey, CachedResponse>,
}

impl std::fmt::Debug for ReplayCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplayCache")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

impl ReplayCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Build the cache described by `config`, or `None` when replay is
    /// disabled.
    pub fn from_config(config: &ReplayConfig) -> Option<Self> {
        config
            .enabled
            .then(|| Self::new(config.capacity, Duration::from_secs(config.ttl_seconds)))
    }

    /// Return the cached response for `request_id`, or run `op` and cache
    /// its successful result.
    pub async fn get_or_run<T, F>(
        &self,
        name: &LockName,
        request_id: &str,
        op: F,
    ) -> Result<T, BackendError>
    where
        T: Replayable,
        F: Future<Output = Result<T, BackendError>>,
    {
        check_request_id(request_id)?;
        let key = ReplayKey {
            operation: T::OPERATION,
            name: name.clone(),
            request_id: request_id.to_owned(),
        };

        if self.cache.contains_key(&key) {
            debug!(lock = %name, request_id, operation = ?T::OPERATION, "replaying cached response");
        }

        let cached = self
            .cache
            .try_get_with(key, async move { op.await.map(Replayable::into_cached) })
            .await
            .map_err(|e| BackendError::clone(&e))?;

        T::from_cached(cached).ok_or_else(|| {
            BackendError::Store(format!(
                "replay cache entry for {request_id} does not match {:?}",
                T::OPERATION
            ))
        })
    }
}

fn check_request_id(request_id: &str) -> Result<(), BackendError> {
    if request_id.trim().is_empty() {
        return Err(BackendError::InvalidRequest(
            "request_id must not be empty".into(),
        ));
    }
    if request_id.len() > MAX_REQUEST_ID_LEN {
        return Err(BackendError::InvalidRequest(format!(
            "request_id exceeds {MAX_REQUEST_ID_LEN} bytes"
        )));
    }
    Ok(())
}
