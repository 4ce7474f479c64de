use serde::Deserialize;

/// Replay cache for mutating requests that carry a `request_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplayConfig {
    /// Whether responses are cached and replayed at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Maximum number of cached responses.
    #[serde(default = "default_capacity")]
    pub capacity: u64,
    /// How long a cached response is replayable, in seconds.
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            capacity: default_capacity(),
            ttl_seconds: default_ttl_seconds(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_capacity() -> u64 {
    100_000
}

fn default_ttl_seconds() -> u64 {
    300
}
