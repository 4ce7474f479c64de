//! Request and response bodies exchanged between the client stub and the
//! authority. The lock name travels in the URL path, not in the body.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::outcome::{AcquireOutcome, ReleaseOutcome, RenewOutcome};
use crate::record::RecordSnapshot;
use crate::types::{AcquirerId, LeaseId};

/// Body of `POST /v1/locks/{name}/acquire`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AcquireRequest {
    /// Lease id minted by the caller for this acquisition.
    pub lease_id: LeaseId,
    /// Diagnostic identity of the caller.
    pub acquirer_id: AcquirerId,
    /// Lease lifetime in milliseconds.
    pub ttl_ms: u64,
    /// Client-generated token identifying this logical operation across
    /// transport retries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Body of `POST /v1/locks/{name}/renew`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RenewRequest {
    pub lease_id: LeaseId,
    /// New lease lifetime in milliseconds, counted from the renewal.
    pub ttl_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Body of `POST /v1/locks/{name}/release`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReleaseRequest {
    pub lease_id: LeaseId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Answer to an acquisition attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AcquireResponse {
    pub outcome: AcquireOutcome,
    /// The record as written (acquired) or as found (held by other).
    pub record: RecordSnapshot,
}

/// Answer to a renewal attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RenewResponse {
    pub outcome: RenewOutcome,
    /// The renewed record; absent when the caller is not the owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<RecordSnapshot>,
}

/// Answer to a release attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReleaseResponse {
    pub outcome: ReleaseOutcome,
}

/// Convert a lease lifetime to the wire's millisecond representation,
/// saturating at `u64::MAX`.
#[must_use]
pub fn duration_to_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)
}
