use serde::{Deserialize, Serialize};

/// Result of a single acquisition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AcquireOutcome {
    /// The caller's lease now holds the lock.
    Acquired,
    /// Another live lease holds the lock; nothing was written.
    HeldByOther,
}

/// Result of a renewal attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum RenewOutcome {
    /// The lease expiry was pushed forward.
    Renewed,
    /// The caller's lease no longer holds the lock.
    NotOwner,
}

/// Result of a release attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ReleaseOutcome {
    /// The lock was cleared.
    Released,
    /// The caller's lease did not hold the lock; nothing was written.
    NotOwner,
}
