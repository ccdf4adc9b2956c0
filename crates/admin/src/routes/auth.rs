//! Staff authentication route handlers.
//!
//! Same credential exchange as the storefront, plus the role gate: a
//! Google account whose backend role is not admin is turned away with a
//! notification instead of a session.

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
use crate::middleware::{clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

/// Credential callback form data.
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
    pub login_uri: String,
}

/// Display the login page.
pub async fn login_page(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    let config = state.config();
    LoginTemplate {
        error: query.error,
        google_client_id: config.google_client_id.clone(),
        login_uri: format!("{}/auth/google", config.base_url.trim_end_matches('/')),
    }
}

/// Handle the posted Google credential with the admin role gate.
#[instrument(skip(state, session, form))]
pub async fn google_callback(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<GoogleCallbackForm>,
) -> Response {
    let exchange = match state.backend().login_google(&form.credential).await {
        Ok(exchange) => exchange,
        Err(e) => {
            tracing::error!(error = %e, "Credential exchange failed");
            return Redirect::to("/login?error=Sign-in+failed.+Please+try+again.").into_response();
        }
    };

    if !exchange.role.is_admin() {
        tracing::warn!("Non-admin account attempted console login");
        return Redirect::to("/login?error=You+are+not+authorized+for+the+staff+console.")
            .into_response();
    }

    // Identity comes from the backend's own user record, not the
    // credential payload.
    let user = match state.backend().get_user(&exchange.token).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load staff profile");
            return Redirect::to("/login?error=Sign-in+failed.+Please+try+again.").into_response();
        }
    };

    let admin = CurrentAdmin {
        token: exchange.token,
        email: user.email,
        name: user.name,
        role: exchange.role,
    };

    if let Err(e) = set_current_admin(&session, &admin).await {
        tracing::error!(error = %e, "Failed to store session");
        return AppError::from(e).into_response();
    }

    tracing::info!(email = %admin.email, "Staff login successful");
    Redirect::to("/orders").into_response()
}

/// Log out: clear the session and return to the login view.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_admin(&session).await {
        tracing::warn!(error = %e, "Failed to clear session on logout");
    }
    Redirect::to("/login").into_response()
}
