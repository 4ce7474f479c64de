use std::time::Duration;

use serde::Deserialize;

use leasegate_backend::BackendConfig;

/// Lock backend tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct LocksConfig {
    /// Read-then-CAS cycles per operation before answering with a
    /// contention error.
    #[serde(default = "default_max_cas_attempts")]
    pub max_cas_attempts: u32,
    /// Shortest lease lifetime accepted, in milliseconds.
    #[serde(default = "default_min_ttl_ms")]
    pub min_ttl_ms: u64,
    /// Longest lease lifetime accepted, in milliseconds.
    #[serde(default = "default_max_ttl_ms")]
    pub max_ttl_ms: u64,
}

impl LocksConfig {
    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            max_cas_attempts: self.max_cas_attempts,
            min_ttl: Duration::from_millis(self.min_ttl_ms),
            max_ttl: Duration::from_millis(self.max_ttl_ms),
        }
    }
}

impl Default for LocksConfig {
    fn default() -> Self {
        Self {
            max_cas_attempts: default_max_cas_attempts(),
            min_ttl_ms: default_min_ttl_ms(),
            max_ttl_ms: default_max_ttl_ms(),
        }
    }
}

fn default_max_cas_attempts() -> u32 {
    8
}

fn default_min_ttl_ms() -> u64 {
    100
}

fn default_max_ttl_ms() -> u64 {
    3_600_000
}
