use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::BackendError;
use crate::types::{AcquirerId, LeaseId, LockName};
use crate::wire::{AcquireResponse, ReleaseResponse, RenewResponse};

/// The lock authority's operation contract.
///
/// Implemented in-process by the optimistic locking backend and remotely by
/// the HTTP client stub. Each method is one logical backend call: callers
/// never need to retry store-level races themselves.
#[async_trait]
pub trait LockBackend: Send + Sync {
    /// Try to take `name` for `lease_id` with a lifetime of `ttl`.
    async fn try_acquire(
        &self,
        name: &LockName,
        lease_id: &LeaseId,
        acquirer_id: &AcquirerId,
        ttl: Duration,
    ) -> Result<AcquireResponse, BackendError>;

    /// Push the expiry of a held lease to `now + ttl`.
    async fn try_renew(
        &self,
        name: &LockName,
        lease_id: &LeaseId,
        ttl: Duration,
    ) -> Result<RenewResponse, BackendError>;

    /// Clear the lock if `lease_id` still holds it.
    async fn try_release(
        &self,
        name: &LockName,
        lease_id: &LeaseId,
    ) -> Result<ReleaseResponse, BackendError>;
}

#[async_trait]
impl<T: LockBackend + ?Sized> LockBackend for Arc<T> {
    async fn try_acquire(
        &self,
        name: &LockName,
        lease_id: &LeaseId,
        acquirer_id: &AcquirerId,
        ttl: Duration,
    ) -> Result<AcquireResponse, BackendError> {
        (**self).try_acquire(name, lease_id, acquirer_id, ttl).await
    }

    async fn try_renew(
        &self,
        name: &LockName,
        lease_id: &LeaseId,
        ttl: Duration,
    ) -> Result<RenewResponse, BackendError> {
        (**self).try_renew(name, lease_id, ttl).await
    }

    async fn try_release(
        &self,
        name: &LockName,
        lease_id: &LeaseId,
    ) -> Result<ReleaseResponse, BackendError> {
        (**self).try_release(name, lease_id).await
    }
}
