use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use leasegate_core::{LockBackend, LockHandle, RenewOutcome};

/// Why a lease keeper stopped renewing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldOutcome {
    /// The keeper was stopped or its token cancelled. The lease was not
    /// released and runs out on its own.
    Stopped,
    /// The authority answered `not_owner`: the lease was released or
    /// reclaimed by someone else.
    Lost,
    /// Renewals kept failing until the lease's local deadline passed, so it
    /// must be assumed gone.
    Expired,
}

/// Owns the background task renewing one lease.
///
/// Dropping the keeper cancels the task. Neither stopping nor dropping
/// releases the lock.
#[derive(Debug)]
pub struct LeaseKeeper {
    handle: LockHandle,
    cancel: CancellationToken,
    lease: CancellationToken,
    task: Option<JoinHandle<HoldOutcome>>,
    outcome: Option<HoldOutcome>,
}

impl LeaseKeeper {
    pub(crate) fn spawn<B>(
        backend: Arc<B>,
        handle: LockHandle,
        ttl: Duration,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self
    where
        B: LockBackend + ?Sized + 'static,
    {
        let lease = cancel.child_token();
        let task = tokio::spawn(renew_loop(
            backend,
            handle.clone(),
            ttl,
            interval,
            cancel.clone(),
            lease.clone(),
        ));
        Self {
            handle,
            cancel,
            lease,
            task: Some(task),
            outcome: None,
        }
    }

    /// The lease being kept.
    pub fn handle(&self) -> &LockHandle {
        &self.handle
    }

    /// A token that is cancelled as soon as the lease can no longer be
    /// trusted: when it is lost, expires, or the keeper stops. Work that
    /// must only run under the lock should abort on it.
    pub fn lease_token(&self) -> CancellationToken {
        self.lease.clone()
    }

    /// Returns `true` once the renewal task has ended.
    pub fn is_finished(&self) -> bool {
        self.outcome.is_some() || self.task.as_ref().is_some_and(JoinHandle::is_finished)
    }

    /// Wait for the renewal task to end. Cancel safe; repeated calls return
    /// the same outcome.
    pub async fn finished(&mut self) -> HoldOutcome {
        if let Some(outcome) = self.outcome {
            return outcome;
        }
        let outcome = match self.task.as_mut() {
            Some(task) => match task.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(lock = %self.handle.name, error = %e, "lease keeper task failed");
                    self.lease.cancel();
                    HoldOutcome::Lost
                }
            },
            None => HoldOutcome::Stopped,
        };
        self.task = None;
        self.outcome = Some(outcome);
        outcome
    }

    /// Stop renewing and wait for the task to end.
    pub async fn stop(mut self) -> HoldOutcome {
        self.cancel.cancel();
        self.finished().await
    }
}

impl Drop for LeaseKeeper {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn renew_loop<B>(
    backend: Arc<B>,
    handle: LockHandle,
    ttl: Duration,
    interval: Duration,
    cancel: CancellationToken,
    lease: CancellationToken,
) -> HoldOutcome
where
    B: LockBackend + ?Sized,
{
    let LockHandle { name, lease_id } = &handle;
    let mut deadline = Instant::now() + ttl;
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(lock = %name, lease_id = %lease_id, ttl_ms = ttl.as_millis(), "holding lease");

    let outcome = loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break HoldOutcome::Stopped,
            () = tokio::time::sleep_until(deadline) => break expired(&handle),
            _ = ticker.tick() => {}
        }

        // A renewal that outlives the lease must not keep it looking alive.
        let sent = Instant::now();
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => break HoldOutcome::Stopped,
            () = tokio::time::sleep_until(deadline) => break expired(&handle),
            result = backend.try_renew(name, lease_id, ttl) => result,
        };

        match result {
            Ok(resp) if resp.outcome == RenewOutcome::Renewed => {
                deadline = sent + ttl;
                debug!(lock = %name, lease_id = %lease_id, "lease renewed");
            }
            Ok(_) => {
                warn!(lock = %name, lease_id = %lease_id, "lease lost");
                break HoldOutcome::Lost;
            }
            Err(e) => {
                warn!(lock = %name, lease_id = %lease_id, error = %e, "lease renewal failed, retrying");
            }
        }
    };

    lease.cancel();
    info!(lock = %name, lease_id = %lease_id, ?outcome, "stopped holding lease");
    outcome
}

fn expired(handle: &LockHandle) -> HoldOutcome {
    warn!(
        lock = %handle.name,
        lease_id = %handle.lease_id,
        "lease deadline passed without a successful renewal"
    );
    HoldOutcome::Expired
}
