use std::time::Duration;

/// Tuning for [`crate::OptimisticLockingBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Read-then-CAS cycles attempted per operation before giving up with
    /// a contention error.
    pub max_cas_attempts: u32,
    /// Shortest lease lifetime accepted on acquire and renew.
    pub min_ttl: Duration,
    /// Longest lease lifetime accepted on acquire and renew.
    pub max_ttl: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            max_cas_attempts: 8,
            min_ttl: Duration::from_millis(100),
            max_ttl: Duration::from_secs(3600),
        }
    }
}
