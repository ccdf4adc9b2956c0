//! Menu management route handlers.
//!
//! Staff see the whole catalog, inactive items included, and create or
//! edit items. Deactivation is just an update with the active flag off -
//! items referenced by past orders must never be deleted outright, or
//! their history lines would lose their names.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use tiffinbox_core::{Category, ItemId, Rupees};

use crate::backend::types::{ItemWrite, MenuItem};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{RequireAdminAuth, on_backend_error};
use crate::state::AppState;

// =============================================================================
// Forms & Validation
// =============================================================================

/// Menu item form fields, as posted.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ItemForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub section: String,
    /// Checkbox: present ("on") when checked, absent otherwise.
    #[serde(default)]
    pub is_active: Option<String>,
}

impl ItemForm {
    fn from_item(item: &MenuItem) -> Self {
        Self {
            name: item.name.clone(),
            description: item.description.clone(),
            price: item.price.to_string(),
            image_url: item.image_url.clone().unwrap_or_default(),
            category: item.category.as_str().to_string(),
            section: item.section.clone(),
            is_active: item.is_active.then(|| "on".to_string()),
        }
    }

    /// Validate into a backend write.
    ///
    /// # Errors
    ///
    /// Returns a list of field messages; nothing has touched the network.
    fn validate(&self) -> Result<ItemWrite, Vec<String>> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("Name is required".to_string());
        }
        if self.section.trim().is_empty() {
            errors.push("Section is required".to_string());
        }

        let price = match self.price.trim().parse::<Decimal>() {
            Ok(price) if price >= Decimal::ZERO => Some(price),
            Ok(_) => {
                errors.push("Price cannot be negative".to_string());
                None
            }
            Err(_) => {
                errors.push("Price must be a number".to_string());
                None
            }
        };

        let category = Category::parse_filter(&self.category);
        if category.is_none() {
            errors.push("Category must be veg or non-veg".to_string());
        }

        match (errors.is_empty(), price, category) {
            (true, Some(price), Some(category)) => Ok(ItemWrite {
                name: self.name.trim().to_string(),
                description: self.description.trim().to_string(),
                price,
                image_url: Some(self.image_url.trim().to_string())
                    .filter(|url| !url.is_empty()),
                is_active: self.is_active.is_some(),
                category,
                section: self.section.trim().to_string(),
            }),
            _ => Err(errors),
        }
    }
}

// =============================================================================
// Views & Templates
// =============================================================================

/// One catalog row.
pub struct ItemRow {
    pub id: i64,
    pub name: String,
    pub price: String,
    pub category: String,
    pub section: String,
    pub is_active: bool,
}

/// Menu listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "menu/index.html")]
pub struct MenuListTemplate {
    pub items: Vec<ItemRow>,
    pub error: Option<String>,
}

/// Create/edit form page template.
#[derive(Template, WebTemplate)]
#[template(path = "menu/form.html")]
pub struct MenuFormTemplate {
    /// `Some(id)` when editing, `None` when creating.
    pub editing: Option<i64>,
    pub form: ItemForm,
    pub errors: Vec<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// List the full catalog.
#[instrument(skip(state, session, admin))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(admin): RequireAdminAuth,
) -> Result<Response, AppError> {
    let (items, error) = match state.backend().get_catalog(&admin.token).await {
        Ok(items) => (items, None),
        Err(e) if e.is_auth_failure() => return Err(on_backend_error(&session, e).await),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch catalog");
            (
                Vec::new(),
                Some("Could not load the catalog. Please retry.".to_string()),
            )
        }
    };

    let rows = items
        .iter()
        .map(|item| ItemRow {
            id: item.id.as_i64(),
            name: item.name.clone(),
            price: Rupees::new(item.price).to_string(),
            category: item.category.to_string(),
            section: item.section.clone(),
            is_active: item.is_active,
        })
        .collect();

    Ok(MenuListTemplate { items: rows, error }.into_response())
}

/// Blank create form.
pub async fn new_form(RequireAdminAuth(_admin): RequireAdminAuth) -> impl IntoResponse {
    MenuFormTemplate {
        editing: None,
        form: ItemForm {
            is_active: Some("on".to_string()),
            ..ItemForm::default()
        },
        errors: Vec::new(),
    }
}

/// Edit form for one item, prefilled from a fresh fetch.
#[instrument(skip(state, session, admin))]
pub async fn edit_form(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let item = match state.backend().get_item(&admin.token, ItemId::new(id)).await {
        Ok(item) => item,
        Err(e) => return Err(on_backend_error(&session, e).await),
    };

    Ok(MenuFormTemplate {
        editing: Some(id),
        form: ItemForm::from_item(&item),
        errors: Vec::new(),
    }
    .into_response())
}

/// Create a menu item.
#[instrument(skip(state, session, admin, form))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(admin): RequireAdminAuth,
    Form(form): Form<ItemForm>,
) -> Result<Response, AppError> {
    let write = match form.validate() {
        Ok(write) => write,
        Err(errors) => {
            return Ok(MenuFormTemplate {
                editing: None,
                form,
                errors,
            }
            .into_response());
        }
    };

    if let Err(e) = state.backend().create_item(&admin.token, &write).await {
        return Err(on_backend_error(&session, e).await);
    }

    tracing::info!(name = %write.name, "Menu item created");
    Ok(Redirect::to("/menu").into_response())
}

/// Update a menu item (including the active flag).
#[instrument(skip(state, session, admin, form))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<i64>,
    Form(form): Form<ItemForm>,
) -> Result<Response, AppError> {
    let write = match form.validate() {
        Ok(write) => write,
        Err(errors) => {
            return Ok(MenuFormTemplate {
                editing: Some(id),
                form,
                errors,
            }
            .into_response());
        }
    };

    if let Err(e) = state
        .backend()
        .update_item(&admin.token, ItemId::new(id), &write)
        .await
    {
        return Err(on_backend_error(&session, e).await);
    }

    tracing::info!(item_id = id, "Menu item updated");
    Ok(Redirect::to("/menu").into_response())
}
