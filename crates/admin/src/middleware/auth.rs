//! Staff authentication extractor.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::backend::BackendError;
use crate::error::AppError;
use crate::models::{CurrentAdmin, session_keys};

/// Extractor that requires a logged-in staff member with the admin role.
pub struct RequireAdminAuth(pub CurrentAdmin);

/// Error returned when staff authentication is missing.
pub enum AuthRejection {
    RedirectToLogin,
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdminAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        let admin: CurrentAdmin = session
            .get(session_keys::CURRENT_ADMIN)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| {
                if parts.headers.contains_key("hx-request") {
                    AuthRejection::Unauthorized
                } else {
                    AuthRejection::RedirectToLogin
                }
            })?;

        // Belt and braces: the login handler already rejects non-admin
        // roles before storing the session.
        if !admin.role.is_admin() {
            return Err(AuthRejection::RedirectToLogin);
        }

        Ok(Self(admin))
    }
}

/// Helper to set the current staff member in the session (login).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Helper to clear the session entirely (logout, or auth failure).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

/// Turn a backend error into the right `AppError`, expiring the session
/// when the failure was an authorization rejection.
pub async fn on_backend_error(session: &Session, err: BackendError) -> AppError {
    if err.is_auth_failure() {
        if let Err(flush_err) = clear_current_admin(session).await {
            tracing::warn!(error = %flush_err, "Failed to clear session after auth failure");
        }
        return AppError::AuthRequired;
    }
    AppError::Backend(err)
}
