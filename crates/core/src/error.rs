use thiserror::Error;

/// Errors from a lock backend call, whether served in-process or over the
/// network.
///
/// Normal protocol states (`held_by_other`, `not_owner`) are outcomes, not
/// errors; see [`crate::outcome`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The request was malformed (bad name, empty lease id, ttl out of range).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Every CAS attempt in the backend's bounded retry loop lost a race.
    #[error("lock contention on {name}: gave up after {attempts} CAS attempts")]
    Contention { name: String, attempts: u32 },

    /// The underlying lock record store failed.
    #[error("store error: {0}")]
    Store(String),

    /// The authority could not be reached or answered unintelligibly.
    #[error("transport error: {message}")]
    Transport { message: String, retryable: bool },
}

impl BackendError {
    /// Returns `true` if repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::InvalidRequest(_) => false,
            Self::Contention { .. } | Self::Store(_) => true,
            Self::Transport { retryable, .. } => *retryable,
        }
    }

    /// Stable machine-readable code used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::Contention { .. } => "CONTENTION",
            Self::Store(_) => "STORE_ERROR",
            Self::Transport { .. } => "TRANSPORT_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(!BackendError::InvalidRequest("x".into()).is_retryable());
        assert!(
            BackendError::Contention {
                name: "deploy".into(),
                attempts: 8
            }
            .is_retryable()
        );
        assert!(BackendError::Store("down".into()).is_retryable());
        assert!(
            !BackendError::Transport {
                message: "bad json".into(),
                retryable: false
            }
            .is_retryable()
        );
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(
            BackendError::InvalidRequest(String::new()).code(),
            "INVALID_REQUEST"
        );
        assert_eq!(BackendError::Store(String::new()).code(), "STORE_ERROR");
    }
}
