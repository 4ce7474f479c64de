use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use leasegate_core::{AcquireOutcome, LeaseId, LockBackend, LockHandle, LockName, ReleaseOutcome};

use crate::error::LockerError;
use crate::keeper::LeaseKeeper;
use crate::options::{AcquireOptions, HoldOptions};

/// Blocking acquisition, background renewal, and release over any
/// [`LockBackend`], local or remote.
///
/// No fairness is guaranteed between waiters: whoever polls first after the
/// lock frees up wins it.
pub struct DistributedLocker<B: ?Sized> {
    backend: Arc<B>,
}

impl<B: ?Sized> Clone for DistributedLocker<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: ?Sized> std::fmt::Debug for DistributedLocker<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistributedLocker").finish_non_exhaustive()
    }
}

impl<B: LockBackend> DistributedLocker<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }
}

impl<B: LockBackend + ?Sized + 'static> DistributedLocker<B> {
    /// Share an existing backend, e.g. an `Arc<dyn LockBackend>`.
    pub fn from_arc(backend: Arc<B>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Acquire `name`, waiting while someone else holds it.
    ///
    /// Mints a fresh lease id and tries once. If the lock is held, the wait
    /// handler is given the rest of the acquisition, which polls on the
    /// configured backoff until the lock is taken, the cancellation token
    /// fires, or the timeout elapses. Cancellation is only observed between
    /// backend calls, so a cancelled acquisition never leaves a lock taken.
    pub async fn acquire(
        &self,
        name: impl Into<LockName>,
        opts: AcquireOptions,
    ) -> Result<LockHandle, LockerError> {
        let name = name.into();
        opts.validate()?;
        let lease_id = LeaseId::generate();
        let deadline = opts.timeout.map(|t| Instant::now() + t);

        if let Some(handle) = self.attempt(&name, &lease_id, &opts, deadline).await? {
            return Ok(handle);
        }

        let wait = Box::pin(self.wait_until_acquired(&name, &lease_id, &opts, deadline));
        opts.wait_handler.wait(&name, wait).await
    }

    /// Try once to acquire `name`; `None` if someone else holds it.
    pub async fn try_acquire(
        &self,
        name: impl Into<LockName>,
        opts: &AcquireOptions,
    ) -> Result<Option<LockHandle>, LockerError> {
        let name = name.into();
        opts.validate()?;
        if opts.cancel.is_cancelled() {
            return Err(LockerError::Cancelled);
        }
        let lease_id = LeaseId::generate();
        let resp = self
            .backend
            .try_acquire(&name, &lease_id, &opts.acquirer_id, opts.ttl)
            .await?;
        Ok(Self::taken(&name, lease_id, resp.outcome))
    }

    /// Start renewing `handle` in the background.
    ///
    /// Must be called from within a tokio runtime.
    pub fn hold_lease(
        &self,
        handle: LockHandle,
        opts: HoldOptions,
    ) -> Result<LeaseKeeper, LockerError> {
        opts.validate()?;
        Ok(LeaseKeeper::spawn(
            Arc::clone(&self.backend),
            handle,
            opts.ttl,
            opts.effective_interval(),
            opts.cancel.child_token(),
        ))
    }

    /// Release `handle`. Failures are logged and returned, never retried
    /// here; an unreleased lease expires on its own.
    pub async fn release(&self, handle: &LockHandle) -> Result<ReleaseOutcome, LockerError> {
        match self.backend.try_release(&handle.name, &handle.lease_id).await {
            Ok(resp) => {
                if resp.outcome == ReleaseOutcome::NotOwner {
                    warn!(
                        lock = %handle.name,
                        lease_id = %handle.lease_id,
                        "release ignored: lease no longer holds the lock"
                    );
                } else {
                    info!(lock = %handle.name, lease_id = %handle.lease_id, "lock released");
                }
                Ok(resp.outcome)
            }
            Err(e) => {
                warn!(lock = %handle.name, lease_id = %handle.lease_id, error = %e, "release failed");
                Err(e.into())
            }
        }
    }

    fn taken(name: &LockName, lease_id: LeaseId, outcome: AcquireOutcome) -> Option<LockHandle> {
        match outcome {
            AcquireOutcome::Acquired => {
                info!(lock = %name, lease_id = %lease_id, "lock acquired");
                Some(LockHandle {
                    name: name.clone(),
                    lease_id,
                })
            }
            AcquireOutcome::HeldByOther => None,
        }
    }

    /// One acquisition attempt during a blocking acquire. Retryable errors
    /// count as "not yet" when the options ask for it.
    ///
    /// The call is bounded by `deadline`. A call cut off by it may still have
    /// been applied by the authority, so the lease is released in the
    /// background.
    async fn attempt(
        &self,
        name: &LockName,
        lease_id: &LeaseId,
        opts: &AcquireOptions,
        deadline: Option<Instant>,
    ) -> Result<Option<LockHandle>, LockerError> {
        if opts.cancel.is_cancelled() {
            return Err(LockerError::Cancelled);
        }
        let call = self
            .backend
            .try_acquire(name, lease_id, &opts.acquirer_id, opts.ttl);
        let result = match deadline {
            Some(at) => match tokio::time::timeout_at(at, call).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(lock = %name, lease_id = %lease_id, "acquire call outlived the timeout");
                    self.abandon(name, lease_id);
                    return Err(timed_out(name, opts.timeout));
                }
            },
            None => call.await,
        };
        match result {
            Ok(resp) => Ok(Self::taken(name, lease_id.clone(), resp.outcome)),
            Err(e) if opts.retry_transport_errors && e.is_retryable() => {
                warn!(lock = %name, error = %e, "acquire attempt failed, will retry");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn wait_until_acquired(
        &self,
        name: &LockName,
        lease_id: &LeaseId,
        opts: &AcquireOptions,
        deadline: Option<Instant>,
    ) -> Result<LockHandle, LockerError> {
        let mut attempt = 0;
        loop {
            let delay = opts.backoff.delay_for(attempt);
            debug!(lock = %name, attempt, delay_ms = delay.as_millis(), "lock busy, backing off");
            pause(name, delay, &opts.cancel, deadline, opts.timeout).await?;
            attempt = attempt.saturating_add(1);

            if let Some(handle) = self.attempt(name, lease_id, opts, deadline).await? {
                return Ok(handle);
            }
        }
    }

    /// Release `lease_id` without waiting for the outcome.
    fn abandon(&self, name: &LockName, lease_id: &LeaseId) {
        let backend = Arc::clone(&self.backend);
        let name = name.clone();
        let lease_id = lease_id.clone();
        tokio::spawn(async move {
            match backend.try_release(&name, &lease_id).await {
                Ok(resp) => {
                    debug!(lock = %name, lease_id = %lease_id, outcome = ?resp.outcome, "abandoned lease released");
                }
                Err(e) => {
                    warn!(lock = %name, lease_id = %lease_id, error = %e, "abandoned lease not released");
                }
            }
        });
    }
}

fn timed_out(name: &LockName, timeout: Option<Duration>) -> LockerError {
    LockerError::Timeout {
        name: name.to_string(),
        timeout: timeout.unwrap_or_default(),
    }
}

/// Sleep for `delay`, unless cancelled or the deadline comes first.
async fn pause(
    name: &LockName,
    delay: Duration,
    cancel: &CancellationToken,
    deadline: Option<Instant>,
    timeout: Option<Duration>,
) -> Result<(), LockerError> {
    let deadline_passed = async {
        match deadline {
            Some(at) => tokio::time::sleep_until(at).await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        biased;
        () = cancel.cancelled() => {
            debug!(lock = %name, "wait cancelled");
            Err(LockerError::Cancelled)
        }
        () = deadline_passed => Err(timed_out(name, timeout)),
        () = tokio::time::sleep(delay) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    use async_trait::async_trait;
    use leasegate_backend::OptimisticLockingBackend;
    use leasegate_core::{
        AcquireResponse, AcquirerId, BackendError, ReleaseResponse, RenewResponse,
    };
    use leasegate_store_memory::MemoryLockStore;

    use super::*;
    use crate::keeper::HoldOutcome;
    use crate::wait::{WaitFuture, WaitHandler};

    fn connection_reset() -> BackendError {
        BackendError::Transport {
            message: "connection reset".into(),
            retryable: true,
        }
    }

    /// The in-process backend with injectable transport failures and stalls.
    struct Scripted {
        inner: OptimisticLockingBackend<MemoryLockStore>,
        failing_acquires: AtomicU32,
        fail_renewals: AtomicBool,
        /// Renewals never answer.
        hang_renewals: AtomicBool,
        /// Acquisitions are applied, then the answer never arrives.
        stall_acquires: AtomicBool,
        acquire_calls: AtomicU32,
    }

    #[async_trait]
    impl LockBackend for Scripted {
        async fn try_acquire(
            &self,
            name: &LockName,
            lease_id: &LeaseId,
            acquirer_id: &AcquirerId,
            ttl: Duration,
        ) -> Result<AcquireResponse, BackendError> {
            self.acquire_calls.fetch_add(1, Ordering::SeqCst);
            if self
                .failing_acquires
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(connection_reset());
            }
            let resp = self.inner.try_acquire(name, lease_id, acquirer_id, ttl).await;
            if self.stall_acquires.load(Ordering::SeqCst) {
                std::future::pending::<()>().await;
            }
            resp
        }

        async fn try_renew(
            &self,
            name: &LockName,
            lease_id: &LeaseId,
            ttl: Duration,
        ) -> Result<RenewResponse, BackendError> {
            if self.hang_renewals.load(Ordering::SeqCst) {
                std::future::pending::<()>().await;
            }
            if self.fail_renewals.load(Ordering::SeqCst) {
                return Err(connection_reset());
            }
            self.inner.try_renew(name, lease_id, ttl).await
        }

        async fn try_release(
            &self,
            name: &LockName,
            lease_id: &LeaseId,
        ) -> Result<ReleaseResponse, BackendError> {
            self.inner.try_release(name, lease_id).await
        }
    }

    fn locker() -> DistributedLocker<Scripted> {
        DistributedLocker::new(Scripted {
            inner: OptimisticLockingBackend::new(MemoryLockStore::new()),
            failing_acquires: AtomicU32::new(0),
            fail_renewals: AtomicBool::new(false),
            hang_renewals: AtomicBool::new(false),
            stall_acquires: AtomicBool::new(false),
            acquire_calls: AtomicU32::new(0),
        })
    }

    fn opts() -> AcquireOptions {
        AcquireOptions::new()
            .acquirer_id("test")
            .poll_interval(Duration::from_secs(1))
    }

    fn spawn_acquire(
        locker: &DistributedLocker<Scripted>,
        opts: AcquireOptions,
    ) -> tokio::task::JoinHandle<Result<LockHandle, LockerError>> {
        let locker = locker.clone();
        tokio::spawn(async move { locker.acquire("deploy", opts).await })
    }

    struct CountingWait(Arc<AtomicU32>);

    #[async_trait]
    impl WaitHandler for CountingWait {
        async fn wait(
            &self,
            _name: &LockName,
            wait: WaitFuture<'_>,
        ) -> Result<LockHandle, LockerError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            wait.await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn free_lock_is_acquired_without_waiting() {
        let locker = locker();
        let started = Instant::now();
        let handle = locker.acquire("deploy", opts()).await.unwrap();

        assert_eq!(handle.name.as_str(), "deploy");
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(locker.backend().acquire_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_until_the_holder_releases() {
        let locker = locker();
        let first = locker.acquire("deploy", opts()).await.unwrap();

        let started = Instant::now();
        let waiter = spawn_acquire(&locker, opts());
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert!(!waiter.is_finished());

        assert_eq!(
            locker.release(&first).await.unwrap(),
            ReleaseOutcome::Released
        );
        let second = waiter.await.unwrap().unwrap();

        assert_ne!(second.lease_id, first.lease_id);
        let waited = started.elapsed();
        assert!(waited >= Duration::from_millis(2500), "{waited:?}");
        assert!(waited < Duration::from_millis(3500), "{waited:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_lease_is_reclaimed_within_ttl_plus_one_poll() {
        let locker = locker();
        let ttl = Duration::from_secs(2);
        let _crashed = locker.acquire("deploy", opts().ttl(ttl)).await.unwrap();

        let started = Instant::now();
        let handle = locker.acquire("deploy", opts()).await.unwrap();
        let waited = started.elapsed();

        assert!(waited >= ttl, "{waited:?}");
        assert!(waited <= ttl + Duration::from_secs(1), "{waited:?}");
        assert!(!handle.lease_id.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_ends_the_wait() {
        let locker = locker();
        let _held = locker.acquire("deploy", opts()).await.unwrap();

        let cancel = CancellationToken::new();
        let waiter = spawn_acquire(&locker, opts().cancel_token(cancel.clone()));
        tokio::time::sleep(Duration::from_millis(1500)).await;

        let started = Instant::now();
        cancel.cancel();
        let err = waiter.await.unwrap().unwrap_err();
        assert_eq!(err, LockerError::Cancelled);
        assert!(started.elapsed() < Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_before_start_makes_no_backend_call() {
        let locker = locker();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = locker
            .acquire("deploy", opts().cancel_token(cancel))
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(locker.backend().acquire_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_ends_the_wait() {
        let locker = locker();
        let _held = locker.acquire("deploy", opts()).await.unwrap();

        let started = Instant::now();
        let err = locker
            .acquire("deploy", opts().timeout(Duration::from_millis(2500)))
            .await
            .unwrap_err();

        assert!(matches!(err, LockerError::Timeout { .. }), "{err:?}");
        let waited = started.elapsed();
        assert!(waited >= Duration::from_millis(2500), "{waited:?}");
        assert!(waited < Duration::from_secs(3), "{waited:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_bounds_a_call_in_flight() {
        let locker = locker();
        locker.backend().stall_acquires.store(true, Ordering::SeqCst);

        let started = Instant::now();
        let err = locker
            .acquire("deploy", opts().timeout(Duration::from_secs(2)))
            .await
            .unwrap_err();

        assert!(matches!(err, LockerError::Timeout { .. }), "{err:?}");
        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(2), "{waited:?}");
        assert!(waited < Duration::from_millis(2100), "{waited:?}");

        // The stalled call took the lock; it is handed back in the background.
        locker.backend().stall_acquires.store(false, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(locker.try_acquire("deploy", &opts()).await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn try_acquire_never_waits() {
        let locker = locker();
        let first = locker.try_acquire("deploy", &opts()).await.unwrap();
        assert!(first.is_some());

        let started = Instant::now();
        let second = locker.try_acquire("deploy", &opts()).await.unwrap();
        assert!(second.is_none());
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_errors_are_returned_unless_retry_is_enabled() {
        let locker = locker();
        locker
            .backend()
            .failing_acquires
            .store(2, Ordering::SeqCst);

        let err = locker.acquire("deploy", opts()).await.unwrap_err();
        assert!(
            matches!(err, LockerError::Backend(BackendError::Transport { .. })),
            "{err:?}"
        );

        let handle = locker
            .acquire("deploy", opts().retry_transport_errors(true))
            .await
            .unwrap();
        assert_eq!(handle.name.as_str(), "deploy");
        assert_eq!(locker.backend().acquire_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_handler_runs_only_when_contended() {
        let locker = locker();
        let calls = Arc::new(AtomicU32::new(0));

        let first = locker
            .acquire(
                "deploy",
                opts()
                    .ttl(Duration::from_secs(1))
                    .wait_handler(CountingWait(Arc::clone(&calls))),
            )
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let second = locker
            .acquire(
                "deploy",
                opts().wait_handler(CountingWait(Arc::clone(&calls))),
            )
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_ne!(first.lease_id, second.lease_id);
    }

    #[tokio::test(start_paused = true)]
    async fn held_lease_outlives_its_ttl() {
        let locker = locker();
        let ttl = Duration::from_secs(3);
        let handle = locker.acquire("deploy", opts().ttl(ttl)).await.unwrap();
        let keeper = locker.hold_lease(handle, HoldOptions::new(ttl)).unwrap();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(!keeper.is_finished());
        assert!(locker.try_acquire("deploy", &opts()).await.unwrap().is_none());

        assert_eq!(keeper.stop().await, HoldOutcome::Stopped);

        // Stopping does not release; the lease runs out on its own.
        assert!(locker.try_acquire("deploy", &opts()).await.unwrap().is_none());
        tokio::time::sleep(ttl + Duration::from_millis(500)).await;
        assert!(locker.try_acquire("deploy", &opts()).await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn keeper_reports_a_lost_lease() {
        let locker = locker();
        let ttl = Duration::from_secs(3);
        let handle = locker.acquire("deploy", opts().ttl(ttl)).await.unwrap();
        let mut keeper = locker
            .hold_lease(handle.clone(), HoldOptions::new(ttl))
            .unwrap();
        let lease = keeper.lease_token();

        // Someone else releases the lease and takes the lock.
        locker.release(&handle).await.unwrap();
        let thief = locker.try_acquire("deploy", &opts()).await.unwrap();
        assert!(thief.is_some());

        assert_eq!(keeper.finished().await, HoldOutcome::Lost);
        assert!(lease.is_cancelled());
        assert!(keeper.is_finished());
        assert_eq!(keeper.finished().await, HoldOutcome::Lost);
    }

    #[tokio::test(start_paused = true)]
    async fn keeper_expires_when_renewals_keep_failing() {
        let locker = locker();
        let ttl = Duration::from_secs(3);
        let handle = locker.acquire("deploy", opts().ttl(ttl)).await.unwrap();

        locker.backend().fail_renewals.store(true, Ordering::SeqCst);
        let started = Instant::now();
        let mut keeper = locker.hold_lease(handle, HoldOptions::new(ttl)).unwrap();

        assert_eq!(keeper.finished().await, HoldOutcome::Expired);
        let held_for = started.elapsed();
        assert!(held_for >= ttl, "{held_for:?}");
        assert!(held_for <= ttl + Duration::from_secs(1), "{held_for:?}");
        assert!(keeper.lease_token().is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn keeper_expires_when_a_renewal_never_answers() {
        let locker = locker();
        let ttl = Duration::from_secs(3);
        let handle = locker.acquire("deploy", opts().ttl(ttl)).await.unwrap();

        locker.backend().hang_renewals.store(true, Ordering::SeqCst);
        let started = Instant::now();
        let mut keeper = locker.hold_lease(handle, HoldOptions::new(ttl)).unwrap();
        let lease = keeper.lease_token();

        assert_eq!(keeper.finished().await, HoldOutcome::Expired);
        let held_for = started.elapsed();
        assert!(held_for >= ttl, "{held_for:?}");
        assert!(held_for < ttl + Duration::from_millis(100), "{held_for:?}");
        assert!(lease.is_cancelled());

        // By the time the token fires, someone else may take the lock.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(locker.try_acquire("deploy", &opts()).await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn lease_token_fires_at_the_deadline_not_the_next_tick() {
        let locker = locker();
        let ttl = Duration::from_secs(3);
        let handle = locker.acquire("deploy", opts().ttl(ttl)).await.unwrap();

        locker.backend().fail_renewals.store(true, Ordering::SeqCst);
        let started = Instant::now();
        let mut keeper = locker
            .hold_lease(
                handle,
                HoldOptions::new(ttl).renew_interval(Duration::from_millis(2500)),
            )
            .unwrap();

        // Ticks at 0s and 2.5s fail; the next would be 5s.
        assert_eq!(keeper.finished().await, HoldOutcome::Expired);
        let held_for = started.elapsed();
        assert!(held_for >= ttl, "{held_for:?}");
        assert!(held_for < ttl + Duration::from_millis(100), "{held_for:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn keeper_survives_transient_renewal_failures() {
        let locker = locker();
        let ttl = Duration::from_secs(3);
        let handle = locker.acquire("deploy", opts().ttl(ttl)).await.unwrap();
        let keeper = locker.hold_lease(handle, HoldOptions::new(ttl)).unwrap();

        locker.backend().fail_renewals.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(1500)).await;
        locker.backend().fail_renewals.store(false, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert!(!keeper.is_finished());
        assert_eq!(keeper.stop().await, HoldOutcome::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_keeper_stops_renewal() {
        let locker = locker();
        let ttl = Duration::from_secs(3);
        let handle = locker.acquire("deploy", opts().ttl(ttl)).await.unwrap();
        let keeper = locker.hold_lease(handle, HoldOptions::new(ttl)).unwrap();
        let lease = keeper.lease_token();

        drop(keeper);
        assert!(lease.is_cancelled());

        tokio::time::sleep(ttl + Duration::from_millis(500)).await;
        assert!(locker.try_acquire("deploy", &opts()).await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn parent_token_stops_the_keeper() {
        let locker = locker();
        let ttl = Duration::from_secs(3);
        let handle = locker.acquire("deploy", opts().ttl(ttl)).await.unwrap();

        let parent = CancellationToken::new();
        let mut keeper = locker
            .hold_lease(handle, HoldOptions::new(ttl).cancel_token(parent.clone()))
            .unwrap();
        parent.cancel();

        assert_eq!(keeper.finished().await, HoldOutcome::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_hold_options_are_rejected() {
        let locker = locker();
        let handle = locker.acquire("deploy", opts()).await.unwrap();
        let err = locker
            .hold_lease(
                handle,
                HoldOptions::new(Duration::from_secs(2)).renew_interval(Duration::from_secs(2)),
            )
            .unwrap_err();
        assert!(matches!(err, LockerError::Config(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn release_by_non_owner_is_reported() {
        let locker = locker();
        let handle = locker.acquire("deploy", opts()).await.unwrap();

        assert_eq!(
            locker.release(&handle).await.unwrap(),
            ReleaseOutcome::Released
        );
        assert_eq!(
            locker.release(&handle).await.unwrap(),
            ReleaseOutcome::NotOwner
        );
    }
}
