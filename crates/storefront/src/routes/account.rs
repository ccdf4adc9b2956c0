//! Account route handlers: profile and saved addresses.
//!
//! All field validation happens here, before any network call; the
//! backend only ever sees well-formed writes. Every mutation re-fetches
//! the user afterwards - the page always renders backend truth.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use tiffinbox_core::{AddressId, Phone};

use crate::backend::types::{AddressWrite, BackendAddress};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{RequireAuth, on_backend_error};
use crate::state::AppState;

// =============================================================================
// Forms & Validation
// =============================================================================

/// Address form fields, as posted.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AddressForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub pincode: String,
    #[serde(default)]
    pub phone: String,
}

/// Field-level validation messages for the address form.
#[derive(Debug, Default)]
pub struct AddressFormErrors {
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub phone: Option<String>,
}

impl AddressFormErrors {
    /// Whether any field failed.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.name.is_some()
            || self.city.is_some()
            || self.state.is_some()
            || self.pincode.is_some()
            || self.phone.is_some()
    }
}

impl AddressForm {
    /// Validate into a backend write. Every field is required; the phone
    /// must be exactly ten digits.
    ///
    /// # Errors
    ///
    /// Returns per-field messages; nothing has touched the network.
    pub fn validate(&self) -> Result<AddressWrite, AddressFormErrors> {
        let mut errors = AddressFormErrors::default();

        let required = |value: &str, slot: &mut Option<String>| {
            if value.trim().is_empty() {
                *slot = Some("This field is required".to_string());
            }
        };
        required(&self.name, &mut errors.name);
        required(&self.city, &mut errors.city);
        required(&self.state, &mut errors.state);
        required(&self.pincode, &mut errors.pincode);

        match Phone::parse(&self.phone) {
            Ok(_) => {}
            Err(e) => errors.phone = Some(e.to_string()),
        }

        if errors.any() {
            return Err(errors);
        }

        Ok(AddressWrite {
            name: self.name.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            pincode: self.pincode.trim().to_string(),
            phone: self.phone.trim().to_string(),
        })
    }
}

/// Profile edit form.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub picture: String,
}

// =============================================================================
// Views & Templates
// =============================================================================

/// Profile display data.
pub struct ProfileView {
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
    pub role: String,
}

/// One saved address row.
pub struct AddressView {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub phone: String,
}

impl From<&BackendAddress> for AddressView {
    fn from(address: &BackendAddress) -> Self {
        Self {
            id: address.id.as_i64(),
            name: address.name.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            pincode: address.pincode.clone(),
            phone: address.phone.clone(),
        }
    }
}

/// Account page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountTemplate {
    pub profile: ProfileView,
    pub addresses: Vec<AddressView>,
    /// When editing, the id of the address whose values fill the form.
    pub editing: Option<i64>,
    pub form: AddressForm,
    pub errors: AddressFormErrors,
    pub notice: Option<String>,
    pub error: Option<String>,
}

/// Query parameters for notice display.
#[derive(Debug, Deserialize, Default)]
pub struct NoticeQuery {
    #[serde(default)]
    pub notice: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

#[allow(clippy::too_many_arguments)]
async fn render_account(
    state: &AppState,
    session: &Session,
    token: &str,
    editing: Option<AddressId>,
    form: Option<AddressForm>,
    errors: AddressFormErrors,
    notice: Option<String>,
    error: Option<String>,
) -> Result<Response, AppError> {
    let user = match state.backend().get_user(token).await {
        Ok(user) => user,
        Err(e) => return Err(on_backend_error(session, e).await),
    };

    let form = form.unwrap_or_else(|| {
        editing
            .and_then(|id| user.addresses.iter().find(|a| a.id == id))
            .map(|a| AddressForm {
                name: a.name.clone(),
                city: a.city.clone(),
                state: a.state.clone(),
                pincode: a.pincode.clone(),
                phone: a.phone.clone(),
            })
            .unwrap_or_default()
    });

    Ok(AccountTemplate {
        profile: ProfileView {
            name: user.name,
            email: user.email.to_string(),
            picture: user.picture,
            role: user.role.to_string(),
        },
        addresses: user.addresses.iter().map(AddressView::from).collect(),
        editing: editing.map(|id| id.as_i64()),
        form,
        errors,
        notice,
        error,
    }
    .into_response())
}

/// Display the account page.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Query(query): Query<NoticeQuery>,
) -> Result<Response, AppError> {
    render_account(
        &state,
        &session,
        &user.token,
        None,
        None,
        AddressFormErrors::default(),
        query.notice,
        query.error,
    )
    .await
}

/// Display the account page with one address loaded into the edit form.
#[instrument(skip(state, session, user))]
pub async fn edit_address(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    render_account(
        &state,
        &session,
        &user.token,
        Some(AddressId::new(id)),
        None,
        AddressFormErrors::default(),
        None,
        None,
    )
    .await
}

/// Edit the display name / avatar.
#[instrument(skip(state, session, user, form))]
pub async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<ProfileForm>,
) -> Result<Response, AppError> {
    if form.name.trim().is_empty() {
        return render_account(
            &state,
            &session,
            &user.token,
            None,
            None,
            AddressFormErrors::default(),
            None,
            Some("Display name is required".to_string()),
        )
        .await;
    }

    let picture = Some(form.picture.trim()).filter(|p| !p.is_empty());
    if let Err(e) = state
        .backend()
        .update_profile(&user.token, form.name.trim(), picture)
        .await
    {
        return Err(on_backend_error(&session, e).await);
    }

    Ok(Redirect::to("/account?notice=Profile+updated").into_response())
}

/// Create a saved address.
#[instrument(skip(state, session, user, form))]
pub async fn create_address(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddressForm>,
) -> Result<Response, AppError> {
    let write = match form.validate() {
        Ok(write) => write,
        Err(errors) => {
            return render_account(
                &state,
                &session,
                &user.token,
                None,
                Some(form),
                errors,
                None,
                None,
            )
            .await;
        }
    };

    if let Err(e) = state.backend().add_address(&user.token, &write).await {
        return Err(on_backend_error(&session, e).await);
    }

    Ok(Redirect::to("/account?notice=Address+added").into_response())
}

/// Update a saved address.
#[instrument(skip(state, session, user, form))]
pub async fn update_address(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i64>,
    Form(form): Form<AddressForm>,
) -> Result<Response, AppError> {
    let address_id = AddressId::new(id);
    let write = match form.validate() {
        Ok(write) => write,
        Err(errors) => {
            return render_account(
                &state,
                &session,
                &user.token,
                Some(address_id),
                Some(form),
                errors,
                None,
                None,
            )
            .await;
        }
    };

    if let Err(e) = state
        .backend()
        .update_address(&user.token, address_id, &write)
        .await
    {
        return Err(on_backend_error(&session, e).await);
    }

    Ok(Redirect::to("/account?notice=Address+updated").into_response())
}

/// Delete a saved address.
#[instrument(skip(state, session, user))]
pub async fn delete_address(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    if let Err(e) = state
        .backend()
        .delete_address(&user.token, AddressId::new(id))
        .await
    {
        return Err(on_backend_error(&session, e).await);
    }

    Ok(Redirect::to("/account?notice=Address+deleted").into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_form() -> AddressForm {
        AddressForm {
            name: "Ravi".to_string(),
            city: "Chennai".to_string(),
            state: "TN".to_string(),
            pincode: "600001".to_string(),
            phone: "9876543210".to_string(),
        }
    }

    #[test]
    fn test_valid_form_passes() {
        assert!(valid_form().validate().is_ok());
    }

    #[test]
    fn test_short_phone_is_field_error() {
        let mut form = valid_form();
        form.phone = "12345".to_string();
        let errors = form.validate().unwrap_err();
        assert!(errors.phone.is_some());
        assert!(errors.name.is_none());
    }

    #[test]
    fn test_missing_fields_are_field_errors() {
        let form = AddressForm::default();
        let errors = form.validate().unwrap_err();
        assert!(errors.name.is_some());
        assert!(errors.city.is_some());
        assert!(errors.state.is_some());
        assert!(errors.pincode.is_some());
        assert!(errors.phone.is_some());
    }

    #[test]
    fn test_values_are_trimmed() {
        let mut form = valid_form();
        form.city = "  Chennai ".to_string();
        let write = form.validate().unwrap();
        assert_eq!(write.city, "Chennai");
    }
}
