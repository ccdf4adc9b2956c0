//! Unified error handling with Sentry integration.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::backend::BackendError;

/// Application-level error type for the admin console.
#[derive(Debug, Error)]
pub enum AppError {
    /// No session, or the backend rejected the bearer token.
    #[error("authentication required")]
    AuthRequired,

    /// The submitted value was outside the fixed enumeration for its
    /// field. No backend call was made.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The ordering backend failed or returned an unexpected shape.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::Internal(format!("session store: {err}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Backend(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        match self {
            Self::AuthRequired | Self::Backend(BackendError::Unauthorized) => {
                Redirect::to("/login").into_response()
            }
            Self::Validation(message) => {
                (StatusCode::UNPROCESSABLE_ENTITY, message).into_response()
            }
            Self::Backend(_) => (
                StatusCode::BAD_GATEWAY,
                "The ordering backend is unreachable right now. Please retry.".to_string(),
            )
                .into_response(),
            Self::NotFound(message) => (StatusCode::NOT_FOUND, message).into_response(),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
                .into_response(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
