//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. The taxonomy follows the
//! recovery path, not the transport: an auth failure redirects to login, a
//! validation failure re-renders the form, a remote failure leaves the
//! prior view intact behind a notification, and nothing aborts the
//! process.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::backend::BackendError;
use crate::models::checkout::CheckoutFlowError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// No session, or the backend rejected the bearer token. The caller
    /// has already cleared the session; this just redirects to login.
    #[error("authentication required")]
    AuthRequired,

    /// Client-side field validation failed. No network call was made.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The ordering backend failed or returned an unexpected shape.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// An illegal checkout transition (e.g. submitting before payment).
    #[error("checkout flow error: {0}")]
    Checkout(#[from] CheckoutFlowError),

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
        // Capture server-side failures to Sentry; user mistakes are not
        // error events.
        if matches!(self, Self::Backend(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        match self {
            // A rejected token means the user is logged out, full stop.
            Self::AuthRequired | Self::Backend(BackendError::Unauthorized) => {
                Redirect::to("/login").into_response()
            }
            Self::Validation(message) => {
                (StatusCode::UNPROCESSABLE_ENTITY, message).into_response()
            }
            Self::Checkout(err @ CheckoutFlowError::NoAddress) => {
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()).into_response()
            }
            Self::Checkout(err) => (StatusCode::CONFLICT, err.to_string()).into_response(),
            Self::Backend(_) => (
                StatusCode::BAD_GATEWAY,
                "The kitchen is unreachable right now. Please retry.".to_string(),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = AppError::NotFound("order 9".to_string());
        assert_eq!(err.to_string(), "not found: order 9");
    }

    #[test]
    fn test_status_codes() {
        fn status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            status(AppError::Validation("phone".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status(AppError::NotFound("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(AppError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_failures_redirect_to_login() {
        let response = AppError::AuthRequired.into_response();
        assert!(response.status().is_redirection());

        let response = AppError::Backend(BackendError::Unauthorized).into_response();
        assert!(response.status().is_redirection());
    }
}
