//! Authentication route handlers.
//!
//! Login is a Google Identity Services credential posted to
//! `/auth/google`, exchanged with the backend for a bearer token. The
//! display claims come out of the credential payload; the backend is the
//! verifier.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::decode_identity_claims;
use crate::state::AppState;

/// Query parameters for error/notice display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

/// Credential callback form data, as Google Identity Services posts it.
#[derive(Debug, Deserialize)]
pub struct GoogleCallbackForm {
    pub credential: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub google_client_id: String,
    /// Absolute URI Google Identity Services posts the credential to.
    pub login_uri: String,
}

/// Display the login page. An already-logged-in visitor goes straight to
/// the menu.
pub async fn login_page(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    let config = state.config();
    LoginTemplate {
        error: query.error,
        google_client_id: config.google_client_id.clone(),
        login_uri: format!("{}/auth/google", config.base_url.trim_end_matches('/')),
    }
    .into_response()
}

/// Handle the posted Google credential.
///
/// Exchanges the credential with the backend for a bearer token, decodes
/// the display claims, and stores the session identity.
#[instrument(skip(state, session, form))]
pub async fn google_callback(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<GoogleCallbackForm>,
) -> Response {
    let claims = match decode_identity_claims(&form.credential) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected login credential");
            return Redirect::to("/login?error=That+sign-in+didn%27t+work.+Please+try+again.")
                .into_response();
        }
    };

    let exchange = match state.backend().login_google(&form.credential).await {
        Ok(exchange) => exchange,
        Err(e) => {
            tracing::error!(error = %e, "Credential exchange failed");
            return Redirect::to("/login?error=Sign-in+failed.+Please+try+again.").into_response();
        }
    };

    let user = CurrentUser {
        token: exchange.token,
        email: claims.email,
        name: claims.name,
        picture: claims.picture,
        role: exchange.role,
    };

    if let Err(e) = set_current_user(&session, &user).await {
        tracing::error!(error = %e, "Failed to store session");
        return AppError::from(e).into_response();
    }

    tracing::info!(email = %user.email, role = %user.role, "Login successful");
    Redirect::to("/").into_response()
}

/// Log out: clear the session and return to the login view.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::warn!(error = %e, "Failed to clear session on logout");
    }
    Redirect::to("/login").into_response()
}
