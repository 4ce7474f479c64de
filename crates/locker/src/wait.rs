use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use leasegate_core::{LockHandle, LockName};

use crate::error::LockerError;

/// The pending remainder of an acquisition: resolves once the lock is taken,
/// or with the error that ended the wait.
pub type WaitFuture<'a> = BoxFuture<'a, Result<LockHandle, LockerError>>;

/// Strategy invoked when a lock is held by someone else.
///
/// The handler receives the contended lock's name and the wait itself. It
/// must drive `wait` to completion and return its result; what it does
/// around that (progress output, metrics) is up to the implementation.
#[async_trait]
pub trait WaitHandler: Send + Sync {
    async fn wait(
        &self,
        name: &LockName,
        wait: WaitFuture<'_>,
    ) -> Result<LockHandle, LockerError>;
}

/// Waits without reporting anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectWait;

#[async_trait]
impl WaitHandler for DirectWait {
    async fn wait(
        &self,
        _name: &LockName,
        wait: WaitFuture<'_>,
    ) -> Result<LockHandle, LockerError> {
        wait.await
    }
}

/// Logs a progress line every `period` while waiting, then a line when the
/// wait ends.
#[derive(Debug, Clone, Copy)]
pub struct ProgressWait {
    period: Duration,
}

impl ProgressWait {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }
}

impl Default for ProgressWait {
    fn default() -> Self {
        Self::new(Duration::from_secs(3))
    }
}

#[async_trait]
impl WaitHandler for ProgressWait {
    async fn wait(
        &self,
        name: &LockName,
        mut wait: WaitFuture<'_>,
    ) -> Result<LockHandle, LockerError> {
        let started = Instant::now();
        info!(lock = %name, "waiting for lock");

        let mut ticker = tokio::time::interval_at(started + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let result = loop {
            tokio::select! {
                result = &mut wait => break result,
                _ = ticker.tick() => {
                    info!(
                        lock = %name,
                        waited_ms = started.elapsed().as_millis(),
                        "still waiting for lock"
                    );
                }
            }
        };

        let waited_ms = started.elapsed().as_millis();
        match &result {
            Ok(handle) => {
                debug!(lock = %name, lease_id = %handle.lease_id, waited_ms, "waiting for lock done");
            }
            Err(e) => warn!(lock = %name, waited_ms, error = %e, "waiting for lock failed"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn progress_wait_returns_the_wait_result() {
        let name = LockName::from("deploy");
        let handler = ProgressWait::new(Duration::from_millis(100));

        let wait: WaitFuture<'_> = Box::pin(async {
            tokio::time::sleep(Duration::from_millis(350)).await;
            Ok(LockHandle::new("deploy", "l1"))
        });
        let handle = handler.wait(&name, wait).await.unwrap();
        assert_eq!(handle.lease_id.as_str(), "l1");

        let wait: WaitFuture<'_> = Box::pin(async { Err(LockerError::Cancelled) });
        let err = handler.wait(&name, wait).await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn direct_wait_passes_through() {
        let wait: WaitFuture<'_> = Box::pin(async { Ok(LockHandle::new("a", "l1")) });
        let handle = DirectWait.wait(&"a".into(), wait).await.unwrap();
        assert_eq!(handle, LockHandle::new("a", "l1"));
    }
}
