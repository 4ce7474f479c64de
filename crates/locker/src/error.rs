use std::time::Duration;

use thiserror::Error;

use leasegate_core::BackendError;

/// Errors returned by the distributed locker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockerError {
    /// The backend call failed and was not retried.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The caller's cancellation token fired while waiting.
    #[error("lock acquisition cancelled")]
    Cancelled,

    /// The overall acquisition timeout elapsed before the lock was free.
    #[error("timed out after {timeout:?} waiting for lock {name}")]
    Timeout { name: String, timeout: Duration },

    /// Options were rejected before any backend call.
    #[error("invalid locker options: {0}")]
    Config(String),
}

impl LockerError {
    /// Returns `true` if the caller asked for the operation to stop.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
