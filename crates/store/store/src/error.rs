use thiserror::Error;

/// Errors from lock record store operations.
///
/// A lost compare-and-swap is not an error; it is reported as
/// [`crate::PutResult::Conflict`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("backend error: {0}")]
    Backend(String),
}
