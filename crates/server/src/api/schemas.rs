use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status indicator.
    #[schema(example = "ok")]
    pub status: String,
    /// Number of locks currently held by a live lease.
    #[schema(example = 3)]
    pub locks: usize,
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message.
    #[schema(example = "invalid request: ttl 0ns outside allowed range 100ms..=3600s")]
    pub error: String,
    /// Stable machine-readable error code.
    #[schema(example = "INVALID_REQUEST")]
    pub code: String,
    /// Whether repeating the same request may succeed.
    #[schema(example = false)]
    pub retryable: bool,
}
