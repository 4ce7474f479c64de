use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::BackendError;

/// Longest lock name accepted by the authority, in bytes.
pub const MAX_LOCK_NAME_LEN: usize = 256;

macro_rules! newtype_string {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
        #[cfg_attr(feature = "openapi", schema(value_type = String))]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new instance from a string value.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Return the inner string as a str slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

newtype_string!(LockName, "Identifies the resource a lock protects.");
newtype_string!(LeaseId, "Proof of ownership for one acquisition of a lock.");
newtype_string!(
    AcquirerId,
    "Identifies the process or session holding a lease. Diagnostic only."
);

impl LockName {
    /// Check that the name can be stored and addressed over HTTP.
    ///
    /// Names must be non-empty, at most [`MAX_LOCK_NAME_LEN`] bytes, free
    /// of `/` and control characters, and not `.` or `..`, which URL paths
    /// collapse away.
    pub fn validate(&self) -> Result<(), BackendError> {
        if self.0.is_empty() {
            return Err(BackendError::InvalidRequest(
                "lock name must not be empty".into(),
            ));
        }
        if self.0.len() > MAX_LOCK_NAME_LEN {
            return Err(BackendError::InvalidRequest(format!(
                "lock name exceeds {MAX_LOCK_NAME_LEN} bytes"
            )));
        }
        if self.0 == "." || self.0 == ".." {
            return Err(BackendError::InvalidRequest(format!(
                "lock name {:?} is a relative path segment",
                self.0
            )));
        }
        if self.0.chars().any(|c| c == '/' || c.is_control()) {
            return Err(BackendError::InvalidRequest(format!(
                "lock name {:?} contains '/' or control characters",
                self.0
            )));
        }
        Ok(())
    }
}

impl LeaseId {
    /// Mint a fresh, globally unique lease id (random v4 UUID).
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Reject empty lease ids before they reach the store.
    pub fn validate(&self) -> Result<(), BackendError> {
        if self.0.trim().is_empty() {
            return Err(BackendError::InvalidRequest(
                "lease id must not be empty".into(),
            ));
        }
        Ok(())
    }
}

impl AcquirerId {
    /// Mint a random acquirer id for callers that have none of their own.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_from_str() {
        let name = LockName::from("deploy");
        assert_eq!(name.as_str(), "deploy");
        assert_eq!(&*name, "deploy");
    }

    #[test]
    fn newtype_serde_is_transparent() {
        let id = LeaseId::new("lease-123");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"lease-123\"");
        let back: LeaseId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn generated_lease_ids_are_unique() {
        let a = LeaseId::generate();
        let b = LeaseId::generate();
        assert_ne!(a, b);
        assert!(uuid::Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn lock_name_validation() {
        assert!(LockName::from("deploy").validate().is_ok());
        assert!(LockName::from("deploy.prod-eu_1").validate().is_ok());
        assert!(LockName::from("").validate().is_err());
        assert!(LockName::from("a/b").validate().is_err());
        assert!(LockName::from("tab\there").validate().is_err());
        assert!(LockName::from(".").validate().is_err());
        assert!(LockName::from("..").validate().is_err());
        assert!(LockName::from("...").validate().is_ok());
        assert!(LockName::from(".deploy").validate().is_ok());
        assert!(
            LockName::new("x".repeat(MAX_LOCK_NAME_LEN + 1))
                .validate()
                .is_err()
        );
        assert!(
            LockName::new("x".repeat(MAX_LOCK_NAME_LEN))
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn empty_lease_id_is_invalid() {
        assert!(LeaseId::from("  ").validate().is_err());
        assert!(LeaseId::generate().validate().is_ok());
    }
}
