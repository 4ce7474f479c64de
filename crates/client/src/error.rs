//! Error types for the Leasegate client.

use thiserror::Error;

use leasegate_core::BackendError;

/// Errors that can occur when using the Leasegate client.
#[derive(Debug, Error)]
pub enum Error {
    /// Connection error (network failure, DNS resolution, timeout, etc.).
    #[error("connection error: {0}")]
    Connection(String),

    /// HTTP error without a structured body.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// API error returned by the authority.
    #[error("API error [{code}]: {message}")]
    Api {
        /// Error code.
        code: String,
        /// Error message.
        message: String,
        /// Whether the request can be retried.
        retryable: bool,
    },

    /// Response deserialization error.
    #[error("failed to deserialize response: {0}")]
    Deserialization(String),

    /// The request was rejected before it was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Client configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Returns `true` if this error is retryable.
    ///
    /// Connection errors, HTTP 5xx errors, and API errors marked as
    /// retryable return `true`.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connection(_) => true,
            Self::Http { status, .. } => *status >= 500,
            Self::Api { retryable, .. } => *retryable,
            Self::Deserialization(_) | Self::InvalidRequest(_) | Self::Configuration(_) => false,
        }
    }

    /// Returns `true` if this is a connection error.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns the API error code if this is an API error.
    pub fn api_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<Error> for BackendError {
    /// Request validation and store failures reported by the authority keep
    /// their meaning; everything else is a transport failure carrying the
    /// original retryability.
    fn from(err: Error) -> Self {
        match err {
            Error::Api { code, message, .. } if code == "INVALID_REQUEST" => {
                Self::InvalidRequest(message)
            }
            Error::Api { code, message, .. } if code == "STORE_ERROR" => Self::Store(message),
            Error::InvalidRequest(message) | Error::Configuration(message) => {
                Self::InvalidRequest(message)
            }
            other => Self::Transport {
                retryable: other.is_retryable(),
                message: other.to_string(),
            },
        }
    }
}
