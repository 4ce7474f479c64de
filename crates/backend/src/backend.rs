use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info, warn};

use leasegate_core::{
    AcquireOutcome, AcquireResponse, AcquirerId, BackendError, LeaseId, LockBackend, LockName,
    LockRecord, RecordSnapshot, ReleaseOutcome, ReleaseResponse, RenewOutcome, RenewResponse,
};
use leasegate_store::{LockRecordStore, PutResult, StoreError};

use crate::clock::{Clock, MonotonicClock};
use crate::config::BackendConfig;

fn store_error(e: StoreError) -> BackendError {
    BackendError::Store(e.to_string())
}

/// [`LockBackend`] built from a store's `get` and CAS `put`.
///
/// Each operation runs a bounded read-then-write loop; a lost CAS race is
/// retried from a fresh read, and only after `max_cas_attempts` losses does
/// the call fail with [`BackendError::Contention`].
#[derive(Debug)]
pub struct OptimisticLockingBackend<S, C = MonotonicClock> {
    store: S,
    clock: C,
    config: BackendConfig,
}

impl<S: LockRecordStore> OptimisticLockingBackend<S> {
    /// Create a backend over `store` with default tuning and the monotonic
    /// clock.
    pub fn new(store: S) -> Self {
        Self {
            store,
            clock: MonotonicClock::new(),
            config: BackendConfig::default(),
        }
    }
}

impl<S: LockRecordStore, C: Clock> OptimisticLockingBackend<S, C> {
    /// Replace the clock.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> OptimisticLockingBackend<S, C2> {
        OptimisticLockingBackend {
            store: self.store,
            clock,
            config: self.config,
        }
    }

    /// Replace the tuning.
    #[must_use]
    pub fn with_config(mut self, config: BackendConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current view of one lock, or `None` if the name was never locked.
    pub async fn inspect(&self, name: &LockName) -> Result<Option<RecordSnapshot>, BackendError> {
        name.validate()?;
        let now = self.clock.now();
        Ok(self
            .store
            .get(name)
            .await
            .map_err(store_error)?
            .map(|v| RecordSnapshot::capture(&v.record, v.version, now)))
    }

    /// Current view of every lock ever taken.
    pub async fn list(&self) -> Result<Vec<RecordSnapshot>, BackendError> {
        let now = self.clock.now();
        Ok(self
            .store
            .scan()
            .await
            .map_err(store_error)?
            .iter()
            .map(|v| RecordSnapshot::capture(&v.record, v.version, now))
            .collect())
    }

    fn check_ttl(&self, ttl: Duration) -> Result<TimeDelta, BackendError> {
        if ttl < self.config.min_ttl || ttl > self.config.max_ttl {
            return Err(BackendError::InvalidRequest(format!(
                "ttl {ttl:?} outside allowed range {:?}..={:?}",
                self.config.min_ttl, self.config.max_ttl
            )));
        }
        TimeDelta::from_std(ttl)
            .map_err(|e| BackendError::InvalidRequest(format!("ttl {ttl:?} too large: {e}")))
    }

    fn expiry(now: DateTime<Utc>, ttl: TimeDelta) -> DateTime<Utc> {
        now.checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    fn contention(&self, name: &LockName, op: &str) -> BackendError {
        warn!(
            lock = %name,
            op,
            attempts = self.config.max_cas_attempts,
            "giving up after repeated CAS conflicts"
        );
        BackendError::Contention {
            name: name.to_string(),
            attempts: self.config.max_cas_attempts,
        }
    }
}

#[async_trait]
impl<S: LockRecordStore, C: Clock> LockBackend for OptimisticLockingBackend<S, C> {
    async fn try_acquire(
        &self,
        name: &LockName,
        lease_id: &LeaseId,
        acquirer_id: &AcquirerId,
        ttl: Duration,
    ) -> Result<AcquireResponse, BackendError> {
        name.validate()?;
        lease_id.validate()?;
        let ttl = self.check_ttl(ttl)?;

        for attempt in 1..=self.config.max_cas_attempts {
            let now = self.clock.now();
            let current = self.store.get(name).await.map_err(store_error)?;

            if let Some(cur) = &current
                && cur.record.is_held_at(now)
                && !cur.record.is_owned_by(lease_id)
            {
                debug!(
                    lock = %name,
                    holder = ?cur.record.acquirer_id,
                    expires_at = %cur.record.expires_at,
                    "lock held by another lease"
                );
                return Ok(AcquireResponse {
                    outcome: AcquireOutcome::HeldByOther,
                    record: RecordSnapshot::capture(&cur.record, cur.version, now),
                });
            }

            let reclaimed = current
                .as_ref()
                .and_then(|cur| cur.record.lease_id.as_ref())
                .filter(|held| *held != lease_id)
                .cloned();
            let expected = current.as_ref().map(|cur| cur.version);
            let record = LockRecord::held(
                name.clone(),
                lease_id.clone(),
                acquirer_id.clone(),
                Self::expiry(now, ttl),
            );

            match self
                .store
                .put(name, record.clone(), expected)
                .await
                .map_err(store_error)?
            {
                PutResult::Stored { version } => {
                    if let Some(stale) = reclaimed {
                        info!(
                            lock = %name,
                            lease_id = %lease_id,
                            acquirer_id = %acquirer_id,
                            stale_lease_id = %stale,
                            version,
                            "reclaimed expired lock"
                        );
                    } else {
                        info!(
                            lock = %name,
                            lease_id = %lease_id,
                            acquirer_id = %acquirer_id,
                            version,
                            "lock acquired"
                        );
                    }
                    return Ok(AcquireResponse {
                        outcome: AcquireOutcome::Acquired,
                        record: RecordSnapshot::capture(&record, version, now),
                    });
                }
                PutResult::Conflict { current } => {
                    debug!(lock = %name, attempt, ?expected, ?current, "acquire lost CAS race");
                }
            }
        }

        Err(self.contention(name, "acquire"))
    }

    async fn try_renew(
        &self,
        name: &LockName,
        lease_id: &LeaseId,
        ttl: Duration,
    ) -> Result<RenewResponse, BackendError> {
        name.validate()?;
        lease_id.validate()?;
        let ttl = self.check_ttl(ttl)?;

        for attempt in 1..=self.config.max_cas_attempts {
            let now = self.clock.now();
            let Some(cur) = self.store.get(name).await.map_err(store_error)? else {
                debug!(lock = %name, lease_id = %lease_id, "renew of unknown lock");
                return Ok(RenewResponse {
                    outcome: RenewOutcome::NotOwner,
                    record: None,
                });
            };

            if !cur.record.is_owned_by(lease_id) {
                debug!(lock = %name, lease_id = %lease_id, "renew by non-owner");
                return Ok(RenewResponse {
                    outcome: RenewOutcome::NotOwner,
                    record: None,
                });
            }

            let record = LockRecord {
                expires_at: Self::expiry(now, ttl),
                ..cur.record
            };

            match self
                .store
                .put(name, record.clone(), Some(cur.version))
                .await
                .map_err(store_error)?
            {
                PutResult::Stored { version } => {
                    debug!(
                        lock = %name,
                        lease_id = %lease_id,
                        expires_at = %record.expires_at,
                        version,
                        "lease renewed"
                    );
                    return Ok(RenewResponse {
                        outcome: RenewOutcome::Renewed,
                        record: Some(RecordSnapshot::capture(&record, version, now)),
                    });
                }
                PutResult::Conflict { current } => {
                    debug!(lock = %name, attempt, expected = cur.version, ?current, "renew lost CAS race");
                }
            }
        }

        Err(self.contention(name, "renew"))
    }

    async fn try_release(
        &self,
        name: &LockName,
        lease_id: &LeaseId,
    ) -> Result<ReleaseResponse, BackendError> {
        name.validate()?;
        lease_id.validate()?;

        for attempt in 1..=self.config.max_cas_attempts {
            let now = self.clock.now();
            let owned = self
                .store
                .get(name)
                .await
                .map_err(store_error)?
                .filter(|cur| cur.record.is_owned_by(lease_id));
            let Some(cur) = owned else {
                debug!(lock = %name, lease_id = %lease_id, "release by non-owner ignored");
                return Ok(ReleaseResponse {
                    outcome: ReleaseOutcome::NotOwner,
                });
            };

            match self
                .store
                .put(name, LockRecord::cleared(name.clone(), now), Some(cur.version))
                .await
                .map_err(store_error)?
            {
                PutResult::Stored { version } => {
                    info!(lock = %name, lease_id = %lease_id, version, "lock released");
                    return Ok(ReleaseResponse {
                        outcome: ReleaseOutcome::Released,
                    });
                }
                PutResult::Conflict { current } => {
                    debug!(lock = %name, attempt, expected = cur.version, ?current, "release lost CAS race");
                }
            }
        }

        Err(self.contention(name, "release"))
    }
}
