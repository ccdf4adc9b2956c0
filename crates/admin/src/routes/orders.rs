//! Staff order console route handlers.
//!
//! Lists every order and applies status/payment-status transitions. The
//! value sets are fixed per field and checked before any backend call; a
//! dropdown is disabled while its own order's update is in flight, and
//! the card re-renders from a post-update re-fetch of the order.

use std::collections::{HashMap, HashSet};

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use tiffinbox_core::{ItemId, OrderFilter, OrderId, OrderStatus, PaymentStatus, Rupees};

use crate::backend::types::{MenuItem, Order, StatusUpdate};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{RequireAdminAuth, on_backend_error};
use crate::models::CurrentAdmin;
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// One dropdown option.
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// One order line row.
pub struct AdminOrderLineView {
    pub name: String,
    pub quantity: u32,
    pub price_at_order: String,
}

/// One order card.
pub struct AdminOrderView {
    pub id: i64,
    pub status_label: String,
    pub payment_status: String,
    pub placed_at: String,
    pub customer: Option<String>,
    pub delivery: String,
    pub pincode: String,
    pub phone: Option<String>,
    pub utr: Option<String>,
    pub screenshot_url: Option<String>,
    pub amount: String,
    pub lines: Vec<AdminOrderLineView>,
    pub status_options: Vec<SelectOption>,
    pub payment_options: Vec<SelectOption>,
}

fn format_placed_at(at: DateTime<Utc>) -> String {
    at.format("%-d %b %Y, %H:%M").to_string()
}

impl AdminOrderView {
    fn new(order: &Order, items: &HashMap<ItemId, MenuItem>) -> Self {
        let status_options = OrderStatus::ASSIGNABLE
            .iter()
            .map(|s| SelectOption {
                value: s.as_str().to_string(),
                label: s.label(),
                selected: *s == order.status,
            })
            .collect();
        let payment_options = PaymentStatus::ASSIGNABLE
            .iter()
            .map(|s| SelectOption {
                value: s.as_str().to_string(),
                label: s.as_str().to_string(),
                selected: *s == order.payment_status,
            })
            .collect();

        Self {
            id: order.id.as_i64(),
            status_label: order.status.label(),
            payment_status: order.payment_status.to_string(),
            placed_at: format_placed_at(order.created_at),
            customer: order
                .user
                .as_ref()
                .map(|u| format!("{} \u{00b7} {}", u.name, u.email)),
            delivery: order.delivery_address.clone(),
            pincode: order.pincode.clone(),
            phone: order.phone.clone(),
            utr: order.utr.clone(),
            screenshot_url: order.screenshot_url.clone(),
            amount: Rupees::new(order.amount).to_string(),
            lines: order
                .items
                .iter()
                .map(|line| AdminOrderLineView {
                    name: items.get(&line.item_id).map_or_else(
                        || format!("Item #{}", line.item_id),
                        |item| item.name.clone(),
                    ),
                    quantity: line.quantity,
                    price_at_order: Rupees::new(line.price_at_order).to_string(),
                })
                .collect(),
            status_options,
            payment_options,
        }
    }
}

/// Resolve every distinct item referenced by the orders, one lookup each.
async fn resolve_items(
    state: &AppState,
    admin: &CurrentAdmin,
    orders: &[Order],
) -> HashMap<ItemId, MenuItem> {
    let distinct: HashSet<ItemId> = orders
        .iter()
        .flat_map(|order| order.items.iter().map(|line| line.item_id))
        .collect();

    let mut items = HashMap::with_capacity(distinct.len());
    for item_id in distinct {
        match state.backend().get_item(&admin.token, item_id).await {
            Ok(item) => {
                items.insert(item_id, item);
            }
            Err(e) => {
                tracing::warn!(item_id = %item_id, error = %e, "Order line item lookup failed");
            }
        }
    }
    items
}

// =============================================================================
// Templates & Forms
// =============================================================================

/// Orders page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct AdminOrdersTemplate {
    pub orders: Vec<AdminOrderView>,
    pub filters: Vec<FilterTab>,
    pub error: Option<String>,
}

/// One status filter tab.
pub struct FilterTab {
    pub value: String,
    pub label: String,
    pub active: bool,
}

/// One order card fragment (HTMX swap target after an update).
#[derive(Template, WebTemplate)]
#[template(path = "partials/order_card.html")]
pub struct OrderCardTemplate {
    pub order: AdminOrderView,
}

/// Listing query parameters.
#[derive(Debug, Deserialize, Default)]
pub struct OrdersQuery {
    #[serde(default)]
    pub status: Option<String>,
}

/// Status transition form.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub field: String,
    pub value: String,
}

impl StatusForm {
    /// Validate into a transition. Values outside the fixed per-field
    /// enumerations never reach the backend.
    fn parse(&self) -> Result<StatusUpdate, AppError> {
        match self.field.as_str() {
            "status" => self
                .value
                .parse::<OrderStatus>()
                .ok()
                .filter(|s| OrderStatus::ASSIGNABLE.contains(s))
                .map(StatusUpdate::Status)
                .ok_or_else(|| {
                    AppError::Validation(format!("invalid order status: {}", self.value))
                }),
            "payment_status" => self
                .value
                .parse::<PaymentStatus>()
                .ok()
                .map(StatusUpdate::Payment)
                .ok_or_else(|| {
                    AppError::Validation(format!("invalid payment status: {}", self.value))
                }),
            other => Err(AppError::Validation(format!("unknown field: {other}"))),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display all orders, newest first.
#[instrument(skip(state, session, admin))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(admin): RequireAdminAuth,
    Query(query): Query<OrdersQuery>,
) -> Result<Response, AppError> {
    let filter = OrderFilter::parse_or_all(query.status.as_deref().unwrap_or("all"));

    let (orders, error) = match state.backend().list_all_orders(&admin.token, filter).await {
        Ok(mut orders) => {
            orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            (orders, None)
        }
        Err(e) if e.is_auth_failure() => return Err(on_backend_error(&session, e).await),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch orders");
            (
                Vec::new(),
                Some("Could not load orders. Please retry.".to_string()),
            )
        }
    };

    let items = resolve_items(&state, &admin, &orders).await;
    let views = orders
        .iter()
        .map(|order| AdminOrderView::new(order, &items))
        .collect();

    let filters = OrderFilter::ALL
        .iter()
        .map(|f| FilterTab {
            value: f.as_str().to_string(),
            label: {
                let mut label = f.as_str().to_string();
                if let Some(first) = label.get_mut(0..1) {
                    first.make_ascii_uppercase();
                }
                label
            },
            active: *f == filter,
        })
        .collect();

    Ok(AdminOrdersTemplate {
        orders: views,
        filters,
        error,
    }
    .into_response())
}

/// Apply one status transition, then re-render the card from a re-fetch.
///
/// The echoed response from the update is deliberately ignored: what the
/// card shows is the backend's post-mutation read.
#[instrument(skip(state, session, admin))]
pub async fn update_status(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<i64>,
    Form(form): Form<StatusForm>,
) -> Result<Response, AppError> {
    let update = form.parse()?;
    let order_id = OrderId::new(id);

    if let Err(e) = state
        .backend()
        .update_order_status(&admin.token, order_id, update)
        .await
    {
        return Err(on_backend_error(&session, e).await);
    }

    let order = match state.backend().get_order(&admin.token, order_id).await {
        Ok(order) => order,
        Err(e) => return Err(on_backend_error(&session, e).await),
    };

    tracing::info!(order_id = %order_id, "Order status updated");

    let items = resolve_items(&state, &admin, std::slice::from_ref(&order)).await;
    Ok(OrderCardTemplate {
        order: AdminOrderView::new(&order, &items),
    }
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_form_accepts_fixed_values() {
        let form = StatusForm {
            field: "status".to_string(),
            value: "preparing".to_string(),
        };
        assert_eq!(
            form.parse().ok(),
            Some(StatusUpdate::Status(OrderStatus::Preparing))
        );

        let form = StatusForm {
            field: "payment_status".to_string(),
            value: "paid".to_string(),
        };
        assert_eq!(
            form.parse().ok(),
            Some(StatusUpdate::Payment(PaymentStatus::Paid))
        );
    }

    #[test]
    fn test_status_form_rejects_out_of_enumeration_values() {
        let form = StatusForm {
            field: "status".to_string(),
            value: "shipped".to_string(),
        };
        assert!(form.parse().is_err());

        // `pending` is creation-time only, not staff-assignable.
        let form = StatusForm {
            field: "status".to_string(),
            value: "pending".to_string(),
        };
        assert!(form.parse().is_err());

        let form = StatusForm {
            field: "payment_status".to_string(),
            value: "refunded".to_string(),
        };
        assert!(form.parse().is_err());

        let form = StatusForm {
            field: "discount".to_string(),
            value: "paid".to_string(),
        };
        assert!(form.parse().is_err());
    }
}
