//! Order history route handlers.
//!
//! Listing is newest first with the fixed status filter row; totals shown
//! here are computed from the frozen price-at-order values, never from
//! current catalog prices. Item details resolve through the cached lookup
//! so one render pass never fetches the same item twice.

use std::collections::{HashMap, HashSet};

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use tiffinbox_core::{ItemId, OrderFilter, OrderId, Rupees};

use crate::backend::types::{MenuItem, Order};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{RequireAuth, on_backend_error};
use crate::models::CurrentUser;
use crate::services::checkout::historical_total;
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// One order line row, resolved against the catalog for display.
pub struct OrderLineView {
    pub name: String,
    pub image_url: Option<String>,
    pub quantity: u32,
    pub price_at_order: String,
    pub line_total: String,
}

/// One order card.
pub struct OrderView {
    pub id: i64,
    pub status_label: String,
    pub payment_status: String,
    pub placed_at: String,
    pub delivery: String,
    pub pincode: String,
    pub phone: Option<String>,
    pub utr: Option<String>,
    pub lines: Vec<OrderLineView>,
    pub total: String,
}

fn format_placed_at(at: DateTime<Utc>) -> String {
    at.format("%-d %b %Y, %H:%M").to_string()
}

impl OrderView {
    fn new(order: &Order, items: &HashMap<ItemId, MenuItem>) -> Self {
        let lines = order
            .items
            .iter()
            .map(|line| {
                let detail = items.get(&line.item_id);
                OrderLineView {
                    name: detail.map_or_else(
                        || format!("Item #{}", line.item_id),
                        |item| item.name.clone(),
                    ),
                    image_url: detail.and_then(|item| item.image_url.clone()),
                    quantity: line.quantity,
                    price_at_order: Rupees::new(line.price_at_order).to_string(),
                    line_total: Rupees::new(line.price_at_order)
                        .times(line.quantity)
                        .to_string(),
                }
            })
            .collect();

        Self {
            id: order.id.as_i64(),
            status_label: order.status.label(),
            payment_status: order.payment_status.to_string(),
            placed_at: format_placed_at(order.created_at),
            delivery: order.delivery_address.clone(),
            pincode: order.pincode.clone(),
            phone: order.phone.clone(),
            utr: order.utr.clone(),
            lines,
            total: Rupees::new(historical_total(&order.items)).to_string(),
        }
    }
}

/// Resolve every distinct item referenced by the orders, one lookup each.
async fn resolve_items(
    state: &AppState,
    user: &CurrentUser,
    orders: &[Order],
) -> HashMap<ItemId, MenuItem> {
    let distinct: HashSet<ItemId> = orders
        .iter()
        .flat_map(|order| order.items.iter().map(|line| line.item_id))
        .collect();

    let mut items = HashMap::with_capacity(distinct.len());
    for item_id in distinct {
        match state.backend().get_item(&user.token, item_id).await {
            Ok(item) => {
                items.insert(item_id, item);
            }
            Err(e) => {
                // A missing item leaves its lines rendered by id; the
                // listing itself still works.
                tracing::warn!(item_id = %item_id, error = %e, "Order line item lookup failed");
            }
        }
    }
    items
}

// =============================================================================
// Templates
// =============================================================================

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub orders: Vec<OrderView>,
    pub filter: String,
    pub filters: Vec<FilterTab>,
    pub placed: Option<String>,
    pub error: Option<String>,
}

/// One status filter tab.
pub struct FilterTab {
    pub value: String,
    pub label: String,
    pub active: bool,
}

/// Printable invoice template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/invoice.html")]
pub struct InvoiceTemplate {
    pub order: OrderView,
    pub payee: String,
}

/// Order listing query parameters.
#[derive(Debug, Deserialize, Default)]
pub struct OrdersQuery {
    #[serde(default)]
    pub status: Option<String>,
    /// Set by checkout completion; shows the confirmation banner.
    #[serde(default)]
    pub placed: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display order history, newest first.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Query(query): Query<OrdersQuery>,
) -> Result<Response, AppError> {
    let filter = OrderFilter::parse_or_all(query.status.as_deref().unwrap_or("all"));

    let (orders, error) = match state.backend().list_my_orders(&user.token, filter).await {
        Ok(mut orders) => {
            orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            (orders, None)
        }
        Err(e) if e.is_auth_failure() => return Err(on_backend_error(&session, e).await),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch orders");
            (
                Vec::new(),
                Some("Could not load your orders. Please retry.".to_string()),
            )
        }
    };

    let items = resolve_items(&state, &user, &orders).await;
    let views = orders
        .iter()
        .map(|order| OrderView::new(order, &items))
        .collect();

    let filters = OrderFilter::ALL
        .iter()
        .map(|f| FilterTab {
            value: f.as_str().to_string(),
            label: {
                let s = f.as_str();
                let mut label = s.to_string();
                if let Some(first) = label.get_mut(0..1) {
                    first.make_ascii_uppercase();
                }
                label
            },
            active: *f == filter,
        })
        .collect();

    Ok(OrdersTemplate {
        orders: views,
        filter: filter.as_str().to_string(),
        filters,
        placed: query.placed,
        error,
    }
    .into_response())
}

/// Render a printable invoice for one order.
///
/// Every amount on the document comes from `PriceAtOrder`; catalog prices
/// may have changed since and must not leak in.
#[instrument(skip(state, session, user))]
pub async fn invoice(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let order = match state.backend().get_order(&user.token, OrderId::new(id)).await {
        Ok(order) => order,
        Err(e) => return Err(on_backend_error(&session, e).await),
    };

    let items = resolve_items(&state, &user, std::slice::from_ref(&order)).await;

    Ok(InvoiceTemplate {
        order: OrderView::new(&order, &items),
        payee: state.config().upi.payee_name.clone(),
    }
    .into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use tiffinbox_core::{OrderLineId, OrderStatus, PaymentStatus};

    fn order_with_line(price_at_order: i64, quantity: u32) -> Order {
        Order {
            id: OrderId::new(1),
            status: OrderStatus::Delivered,
            payment_status: PaymentStatus::Paid,
            amount: Decimal::from(price_at_order),
            delivery_address: "Ravi, Chennai, TN".to_string(),
            pincode: "600001".to_string(),
            phone: None,
            utr: None,
            screenshot_url: None,
            created_at: "2026-03-01T10:00:00Z".parse().unwrap(),
            items: vec![crate::backend::types::OrderLine {
                id: OrderLineId::new(1),
                item_id: ItemId::new(3),
                quantity,
                price_at_order: Decimal::from(price_at_order),
            }],
            user: None,
        }
    }

    #[test]
    fn test_history_total_ignores_current_catalog_price() {
        // Catalog now says ₹200; the order froze ₹90 at creation.
        let order = order_with_line(90, 2);
        let mut items = HashMap::new();
        items.insert(
            ItemId::new(3),
            MenuItem {
                id: ItemId::new(3),
                name: "Biryani".to_string(),
                description: String::new(),
                price: Decimal::from(200),
                image_url: None,
                is_active: true,
                category: tiffinbox_core::Category::NonVeg,
                section: "Main".to_string(),
                created_at: None,
            },
        );

        let view = OrderView::new(&order, &items);
        assert_eq!(view.total, "₹180");
        assert_eq!(view.lines[0].price_at_order, "₹90");
        assert_eq!(view.lines[0].name, "Biryani");
    }

    #[test]
    fn test_unresolved_item_renders_by_id() {
        let order = order_with_line(50, 1);
        let view = OrderView::new(&order, &HashMap::new());
        assert_eq!(view.lines[0].name, "Item #3");
    }
}
