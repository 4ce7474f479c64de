mod locks;
mod replay;
mod server;


pub use locks::*;
pub use replay::*;
pub use server::*;

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::ServerError;

/// Top-level configuration for the Leasegate server, loaded from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeasegateConfig {
    /// HTTP server bind configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Lock backend tuning.
    #[serde(default)]
    pub locks: LocksConfig,
    /// Request replay cache.
    #[serde(default)]
    pub replay: ReplayConfig,
}

impl LeasegateConfig {
    /// Load configuration from `path`, or use defaults if the file does not
    /// exist.
    pub fn load(path: &Path) -> Result<Self, ServerError> {
        if !path.exists() {
            info!(path = %path.display(), "config file not found, using defaults");
            return Self::parse("");
        }
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))
    }

    /// Parse configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self, ServerError> {
        toml::from_str(contents).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<(), ServerError> {
        let locks = &self.locks;
        if locks.max_cas_attempts == 0 {
            return Err(ServerError::Config(
                "locks.max_cas_attempts must be at least 1".into(),
            ));
        }
        if locks.min_ttl_ms == 0 {
            return Err(ServerError::Config(
                "locks.min_ttl_ms must be greater than 0".into(),
            ));
        }
        if locks.min_ttl_ms > locks.max_ttl_ms {
            return Err(ServerError::Config(format!(
                "locks.min_ttl_ms ({}) exceeds locks.max_ttl_ms ({})",
                locks.min_ttl_ms, locks.max_ttl_ms
            )));
        }
        if self.replay.enabled && (self.replay.capacity == 0 || self.replay.ttl_seconds == 0) {
            return Err(ServerError::Config(
                "replay.capacity and replay.ttl_seconds must be non-zero when replay is enabled"
                    .into(),
            ));
        }
        Ok(())
    }
}
