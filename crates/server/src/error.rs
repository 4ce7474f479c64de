use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use leasegate_core::BackendError;

use crate::api::schemas::ErrorResponse;

/// Errors that can occur when running the Leasegate server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error (e.g. binding the listener).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A lock backend error surfaced through the API.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The request body could not be parsed.
    #[error("malformed request body: {0}")]
    MalformedBody(String),

    /// The requested lock has never been taken.
    #[error("lock not found: {0}")]
    NotFound(String),
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody(rejection.body_text())
    }
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Backend(BackendError::InvalidRequest(_)) | Self::MalformedBody(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Backend(BackendError::Contention { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Backend(BackendError::Transport { .. }) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Backend(BackendError::Store(_)) | Self::Config(_) | Self::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Backend(e) => e.code(),
            Self::MalformedBody(_) => "INVALID_REQUEST",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Config(_) | Self::Io(_) => "INTERNAL_ERROR",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Backend(e) => e.is_retryable(),
            _ => false,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.code(), "request failed");
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code().to_owned(),
            retryable: self.retryable(),
        };
        (status, Json(body)).into_response()
    }
}
