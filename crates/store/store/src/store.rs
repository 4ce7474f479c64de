use std::sync::Arc;

use async_trait::async_trait;

use leasegate_core::{LockName, LockRecord, Version};

use crate::error::StoreError;

/// A lock record together with the version it was stored at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedRecord {
    pub record: LockRecord,
    pub version: Version,
}

/// Result of a compare-and-swap write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutResult {
    /// The write succeeded and the record is now at `version`.
    Stored { version: Version },
    /// The expected version did not match. `current` is the version found,
    /// or `None` if no record exists.
    Conflict { current: Option<Version> },
}

/// Keyed storage for lock records with per-key compare-and-swap.
///
/// This is the seam where a durable or replicated store can replace the
/// in-memory one: the backend relies only on `get` and `put` being atomic
/// per key. Implementations must be `Send + Sync` and safe for concurrent
/// access.
#[async_trait]
pub trait LockRecordStore: Send + Sync {
    /// Read the current record for `name`. Returns `None` if it was never
    /// written.
    async fn get(&self, name: &LockName) -> Result<Option<VersionedRecord>, StoreError>;

    /// Write `record` under `name` only if the stored version equals
    /// `expected`.
    ///
    /// `expected = None` succeeds only when no record exists yet. Every
    /// successful write assigns a version strictly greater than `expected`;
    /// versions are never reused.
    async fn put(
        &self,
        name: &LockName,
        record: LockRecord,
        expected: Option<Version>,
    ) -> Result<PutResult, StoreError>;

    /// Return every stored record. Used for diagnostics listing only.
    async fn scan(&self) -> Result<Vec<VersionedRecord>, StoreError>;
}

#[async_trait]
impl<T: LockRecordStore + ?Sized> LockRecordStore for Arc<T> {
    async fn get(&self, name: &LockName) -> Result<Option<VersionedRecord>, StoreError> {
        (**self).get(name).await
    }

    async fn put(
        &self,
        name: &LockName,
        record: LockRecord,
        expected: Option<Version>,
    ) -> Result<PutResult, StoreError> {
        (**self).put(name, record, expected).await
    }

    async fn scan(&self) -> Result<Vec<VersionedRecord>, StoreError> {
        (**self).scan().await
    }
}
