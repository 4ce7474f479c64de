use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use leasegate_core::{AcquirerId, RetryStrategy};

use crate::error::LockerError;
use crate::wait::{DirectWait, WaitHandler};

/// Default lease lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(10);

/// Default delay between acquisition attempts on a held lock.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// How [`crate::DistributedLocker::acquire`] behaves.
#[derive(Clone)]
pub struct AcquireOptions {
    /// Diagnostic identity recorded on the lock.
    pub acquirer_id: AcquirerId,
    /// Lifetime of the lease once acquired.
    pub ttl: Duration,
    /// Invoked when the lock is held by someone else.
    pub wait_handler: Arc<dyn WaitHandler>,
    /// Delay between attempts while waiting.
    pub backoff: RetryStrategy,
    /// Give up with [`LockerError::Timeout`] after this long.
    pub timeout: Option<Duration>,
    /// Fires to abandon the wait with [`LockerError::Cancelled`].
    pub cancel: CancellationToken,
    /// Keep waiting through retryable backend errors instead of returning
    /// them.
    pub retry_transport_errors: bool,
}

impl AcquireOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn acquirer_id(mut self, acquirer_id: impl Into<AcquirerId>) -> Self {
        self.acquirer_id = acquirer_id.into();
        self
    }

    #[must_use]
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub fn wait_handler(mut self, handler: impl WaitHandler + 'static) -> Self {
        self.wait_handler = Arc::new(handler);
        self
    }

    /// Poll a held lock at a fixed interval.
    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.backoff = RetryStrategy::constant(interval);
        self
    }

    #[must_use]
    pub fn backoff(mut self, backoff: RetryStrategy) -> Self {
        self.backoff = backoff;
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn retry_transport_errors(mut self, retry: bool) -> Self {
        self.retry_transport_errors = retry;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), LockerError> {
        if self.ttl.is_zero() {
            return Err(LockerError::Config("ttl must be greater than zero".into()));
        }
        Ok(())
    }
}

impl Default for AcquireOptions {
    fn default() -> Self {
        Self {
            acquirer_id: AcquirerId::generate(),
            ttl: DEFAULT_TTL,
            wait_handler: Arc::new(DirectWait),
            backoff: RetryStrategy::constant(DEFAULT_POLL_INTERVAL),
            timeout: None,
            cancel: CancellationToken::new(),
            retry_transport_errors: false,
        }
    }
}

impl fmt::Debug for AcquireOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AcquireOptions")
            .field("acquirer_id", &self.acquirer_id)
            .field("ttl", &self.ttl)
            .field("backoff", &self.backoff)
            .field("timeout", &self.timeout)
            .field("cancelled", &self.cancel.is_cancelled())
            .field("retry_transport_errors", &self.retry_transport_errors)
            .finish_non_exhaustive()
    }
}

/// How [`crate::DistributedLocker::hold_lease`] renews.
#[derive(Debug, Clone)]
pub struct HoldOptions {
    /// Lifetime requested on every renewal.
    pub ttl: Duration,
    /// Delay between renewals; defaults to a third of `ttl`.
    pub renew_interval: Option<Duration>,
    /// Cancelling this token stops the keeper, like
    /// [`crate::LeaseKeeper::stop`].
    pub cancel: CancellationToken,
}

impl HoldOptions {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            renew_interval: None,
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn renew_interval(mut self, interval: Duration) -> Self {
        self.renew_interval = Some(interval);
        self
    }

    #[must_use]
    pub fn cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The interval actually used between renewals.
    pub fn effective_interval(&self) -> Duration {
        self.renew_interval.unwrap_or(self.ttl / 3)
    }

    pub(crate) fn validate(&self) -> Result<(), LockerError> {
        if self.ttl.is_zero() {
            return Err(LockerError::Config("ttl must be greater than zero".into()));
        }
        let interval = self.effective_interval();
        if interval.is_zero() || interval >= self.ttl {
            return Err(LockerError::Config(format!(
                "renew interval {interval:?} must be positive and shorter than ttl {:?}",
                self.ttl
            )));
        }
        Ok(())
    }
}

impl Default for HoldOptions {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_defaults() {
        let opts = AcquireOptions::default();
        assert_eq!(opts.ttl, Duration::from_secs(10));
        assert_eq!(opts.backoff.delay_for(3), Duration::from_secs(1));
        assert!(opts.timeout.is_none());
        assert!(!opts.retry_transport_errors);
        opts.validate().unwrap();

        let zero = AcquireOptions::new().ttl(Duration::ZERO);
        assert!(matches!(zero.validate(), Err(LockerError::Config(_))));
    }

    #[test]
    fn hold_interval_defaults_to_a_third_of_ttl() {
        let opts = HoldOptions::new(Duration::from_secs(9));
        assert_eq!(opts.effective_interval(), Duration::from_secs(3));
        opts.validate().unwrap();
    }

    #[test]
    fn hold_interval_must_be_shorter_than_ttl() {
        for interval in [Duration::ZERO, Duration::from_secs(2), Duration::from_secs(5)] {
            let opts = HoldOptions::new(Duration::from_secs(2)).renew_interval(interval);
            assert!(
                matches!(opts.validate(), Err(LockerError::Config(_))),
                "{interval:?}"
            );
        }
        assert!(matches!(
            HoldOptions::new(Duration::ZERO).validate(),
            Err(LockerError::Config(_))
        ));
    }
}
