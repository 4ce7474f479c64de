use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AcquirerId, LeaseId, LockName};

/// CAS token for a lock record. Strictly increases with every write and is
/// never reused once superseded.
pub type Version = u64;

/// Lease state for one lock name, as kept by the lock record store.
///
/// A record with no `lease_id` is cleared (unheld). A record whose
/// `expires_at` has passed is abandoned and also counts as unheld for new
/// acquisitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    pub name: LockName,
    pub lease_id: Option<LeaseId>,
    pub acquirer_id: Option<AcquirerId>,
    pub expires_at: DateTime<Utc>,
}

impl LockRecord {
    /// A record held by `lease_id` until `expires_at`.
    #[must_use]
    pub fn held(
        name: LockName,
        lease_id: LeaseId,
        acquirer_id: AcquirerId,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name,
            lease_id: Some(lease_id),
            acquirer_id: Some(acquirer_id),
            expires_at,
        }
    }

    /// A cleared record, as written on release.
    #[must_use]
    pub fn cleared(name: LockName, at: DateTime<Utc>) -> Self {
        Self {
            name,
            lease_id: None,
            acquirer_id: None,
            expires_at: at,
        }
    }

    /// Returns `true` if some lease holds the lock and has not expired at `now`.
    #[must_use]
    pub fn is_held_at(&self, now: DateTime<Utc>) -> bool {
        self.lease_id.is_some() && self.expires_at > now
    }

    /// Returns `true` if `lease_id` is the lease recorded on this record,
    /// regardless of expiry.
    #[must_use]
    pub fn is_owned_by(&self, lease_id: &LeaseId) -> bool {
        self.lease_id.as_ref() == Some(lease_id)
    }
}

/// The minimal proof of ownership a caller keeps after acquiring a lock.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LockHandle {
    pub name: LockName,
    pub lease_id: LeaseId,
}

impl LockHandle {
    #[must_use]
    pub fn new(name: impl Into<LockName>, lease_id: impl Into<LeaseId>) -> Self {
        Self {
            name: name.into(),
            lease_id: lease_id.into(),
        }
    }
}

/// Read-only view of a lock record at a point in time, as returned on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RecordSnapshot {
    /// Lock name.
    pub name: LockName,
    /// Current holder, if any (may be expired, see `held`).
    pub lease_id: Option<LeaseId>,
    /// Current holder's acquirer id, if any.
    pub acquirer_id: Option<AcquirerId>,
    /// When the current lease is considered abandoned.
    pub expires_at: DateTime<Utc>,
    /// Record version after the last write.
    pub version: Version,
    /// Whether a live lease held the lock when the snapshot was taken.
    pub held: bool,
}

impl RecordSnapshot {
    /// Capture `record` at `version`, evaluating liveness at `now`.
    #[must_use]
    pub fn capture(record: &LockRecord, version: Version, now: DateTime<Utc>) -> Self {
        Self {
            name: record.name.clone(),
            lease_id: record.lease_id.clone(),
            acquirer_id: record.acquirer_id.clone(),
            expires_at: record.expires_at,
            version,
            held: record.is_held_at(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn held_record_expires() {
        let record = LockRecord::held(
            "deploy".into(),
            "l1".into(),
            "a1".into(),
            now() + TimeDelta::seconds(10),
        );
        assert!(record.is_held_at(now()));
        assert!(record.is_held_at(now() + TimeDelta::seconds(9)));
        assert!(!record.is_held_at(now() + TimeDelta::seconds(10)));
        assert!(record.is_owned_by(&"l1".into()));
        assert!(!record.is_owned_by(&"l2".into()));
    }

    #[test]
    fn cleared_record_is_never_held() {
        let record = LockRecord::cleared("deploy".into(), now() + TimeDelta::hours(1));
        assert!(!record.is_held_at(now()));
        assert!(!record.is_owned_by(&"l1".into()));
    }

    #[test]
    fn snapshot_reports_liveness() {
        let record = LockRecord::held(
            "deploy".into(),
            "l1".into(),
            "a1".into(),
            now() + TimeDelta::seconds(1),
        );
        let live = RecordSnapshot::capture(&record, 3, now());
        assert!(live.held);
        assert_eq!(live.version, 3);

        let stale = RecordSnapshot::capture(&record, 3, now() + TimeDelta::seconds(2));
        assert!(!stale.held);
        assert_eq!(stale.lease_id, Some("l1".into()));
    }
}
