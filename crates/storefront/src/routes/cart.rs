//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page
//! reloads. Every mutation renders from the post-mutation authoritative
//! read, and every response names what changed ("added", "removed",
//! "updated") since there is no optimistic UI to infer it from.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use tiffinbox_core::{ItemId, Rupees};

use crate::backend::types::Quantities;
use crate::error::AppError;
use crate::filters;
use crate::middleware::{RequireAuth, on_backend_error};
use crate::models::CurrentUser;
use crate::services::cart::{self, CartError, CartOutcome};
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// One cart row.
pub struct CartLineView {
    pub item_id: i64,
    pub name: String,
    pub description: String,
    pub price: String,
    pub line_total: String,
    pub quantity: u32,
    pub image_url: Option<String>,
    pub available: bool,
}

/// Cart display data for templates.
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub count: u32,
    pub is_empty: bool,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            lines: Vec::new(),
            total: Rupees::ZERO.to_string(),
            count: 0,
            is_empty: true,
        }
    }

    /// Resolve the quantity map into display rows via the cached item
    /// lookup. A line whose item has vanished still renders (marked
    /// unavailable) instead of crashing the page.
    pub async fn load(state: &AppState, user: &CurrentUser, quantities: &Quantities) -> Self {
        let mut entries: Vec<_> = quantities.iter().map(|(id, qty)| (*id, *qty)).collect();
        entries.sort_by_key(|(id, _)| *id);

        let mut lines = Vec::with_capacity(entries.len());
        let mut total = Rupees::ZERO;
        let mut count = 0;

        for (item_id, quantity) in entries {
            count += quantity;
            match state.backend().get_item(&user.token, item_id).await {
                Ok(item) => {
                    let unit = Rupees::new(item.price);
                    let line_total = unit.times(quantity);
                    total = total + line_total;
                    lines.push(CartLineView {
                        item_id: item_id.as_i64(),
                        name: item.name,
                        description: item.description,
                        price: unit.to_string(),
                        line_total: line_total.to_string(),
                        quantity,
                        image_url: item.image_url,
                        available: true,
                    });
                }
                Err(e) => {
                    tracing::warn!(item_id = %item_id, error = %e, "Cart line item lookup failed");
                    lines.push(CartLineView {
                        item_id: item_id.as_i64(),
                        name: "Item unavailable".to_string(),
                        description: String::new(),
                        price: "--".to_string(),
                        line_total: "--".to_string(),
                        quantity,
                        image_url: None,
                        available: false,
                    });
                }
            }
        }

        Self {
            is_empty: lines.is_empty(),
            lines,
            total: total.to_string(),
            count,
        }
    }
}

// =============================================================================
// Form Types
// =============================================================================

/// Absolute-quantity update form (cart page rows).
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub item_id: i64,
    pub quantity: i64,
}

/// Increment/decrement form (menu steppers).
#[derive(Debug, Deserialize)]
pub struct AdjustCartForm {
    pub item_id: i64,
    pub dir: Direction,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inc,
    Dec,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    /// Always `None` on the full page; the included items partial only
    /// renders a toast on fragment responses.
    pub toast: Option<&'static str>,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
    pub toast: Option<&'static str>,
}

/// Menu stepper fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/stepper.html")]
pub struct StepperTemplate {
    pub item_id: i64,
    pub quantity: u32,
    pub toast: Option<&'static str>,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Response, AppError> {
    let quantities = match cart::quantities(state.backend(), &user).await {
        Ok(quantities) => quantities,
        Err(e) => return Err(on_backend_error(&session, e).await),
    };

    let cart = CartView::load(&state, &user, &quantities).await;
    Ok(CartShowTemplate { cart, toast: None }.into_response())
}

/// Set an absolute quantity for one line (cart page).
///
/// Returns the re-rendered cart items fragment built from the
/// authoritative re-read.
#[instrument(skip(state, session, user))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response, AppError> {
    let outcome = cart::set_quantity(
        state.backend(),
        &user,
        ItemId::new(form.item_id),
        form.quantity,
    )
    .await;

    render_cart_fragment(&state, &session, &user, outcome).await
}

/// Increment/decrement one line (menu stepper), clamped at zero.
///
/// Returns the stepper fragment plus out-of-band toast and cart badge.
#[instrument(skip(state, session, user))]
pub async fn adjust(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AdjustCartForm>,
) -> Result<Response, AppError> {
    let delta = match form.dir {
        Direction::Inc => 1,
        Direction::Dec => -1,
    };
    let item_id = ItemId::new(form.item_id);
    let outcome = cart::adjust_quantity(state.backend(), &user, item_id, delta).await;

    match outcome {
        Ok(CartOutcome { quantities, change }) => {
            let quantity = quantities.get(&item_id).copied().unwrap_or(0);
            Ok((
                AppendHeaders([("HX-Trigger", "cart-updated")]),
                StepperTemplate {
                    item_id: form.item_id,
                    quantity,
                    toast: change.map(|c| c.message()),
                },
            )
                .into_response())
        }
        Err(CartError::NegativeQuantity) => {
            Err(AppError::Validation("quantity cannot be negative".into()))
        }
        Err(CartError::Backend(e)) => Err(on_backend_error(&session, e).await),
    }
}

/// Get cart count badge (HTMX).
#[instrument(skip(state, user))]
pub async fn count(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> impl IntoResponse {
    let count = cart::quantities(state.backend(), &user)
        .await
        .map(|quantities| quantities.values().sum())
        .unwrap_or(0);

    CartCountTemplate { count }
}

async fn render_cart_fragment(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
    outcome: Result<CartOutcome, CartError>,
) -> Result<Response, AppError> {
    match outcome {
        Ok(CartOutcome { quantities, change }) => {
            let cart = CartView::load(state, user, &quantities).await;
            Ok((
                AppendHeaders([("HX-Trigger", "cart-updated")]),
                CartItemsTemplate {
                    cart,
                    toast: change.map(|c| c.message()),
                },
            )
                .into_response())
        }
        Err(CartError::NegativeQuantity) => {
            Err(AppError::Validation("quantity cannot be negative".into()))
        }
        Err(CartError::Backend(e)) => Err(on_backend_error(session, e).await),
    }
}
