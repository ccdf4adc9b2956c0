//! Wire types for the staff surface of the ordering backend.
//!
//! Same typed-boundary rules as the storefront: PascalCase reads,
//! camelCase writes, no aliasing across casing variants.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tiffinbox_core::{
    Category, Email, ItemId, OrderId, OrderLineId, OrderStatus, PaymentStatus, Role, UserId,
};

// =============================================================================
// Auth
// =============================================================================

/// Request body for the Google ID token exchange.
#[derive(Debug, Serialize)]
pub struct TokenExchangeRequest {
    #[serde(rename = "idToken")]
    pub id_token: String,
}

/// Bearer token and role issued by the backend at login.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenExchange {
    pub token: String,
    pub role: Role,
}

/// The authenticated user (role check at login).
#[derive(Debug, Clone, Deserialize)]
pub struct BackendUser {
    #[serde(rename = "ID")]
    pub id: UserId,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Email")]
    pub email: Email,
    #[serde(rename = "Role")]
    pub role: Role,
}

// =============================================================================
// Catalog
// =============================================================================

/// A menu item, inactive ones included - staff see the whole catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct MenuItem {
    #[serde(rename = "ID")]
    pub id: ItemId,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Price")]
    pub price: Decimal,
    #[serde(rename = "ImageURL", default)]
    pub image_url: Option<String>,
    #[serde(rename = "IsActive")]
    pub is_active: bool,
    #[serde(rename = "Category")]
    pub category: Category,
    #[serde(rename = "Type")]
    pub section: String,
    #[serde(rename = "CreatedAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Menu item create/update request body.
#[derive(Debug, Clone, Serialize)]
pub struct ItemWrite {
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    pub category: Category,
    #[serde(rename = "type")]
    pub section: String,
}

// =============================================================================
// Orders
// =============================================================================

/// A placed order, with the owning-user snapshot staff listings carry.
#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    #[serde(rename = "ID")]
    pub id: OrderId,
    #[serde(rename = "Status")]
    pub status: OrderStatus,
    #[serde(rename = "PaymentStatus")]
    pub payment_status: PaymentStatus,
    #[serde(rename = "Amount")]
    pub amount: Decimal,
    #[serde(rename = "DeliveryAddress")]
    pub delivery_address: String,
    #[serde(rename = "Pincode")]
    pub pincode: String,
    #[serde(rename = "Phone", default)]
    pub phone: Option<String>,
    #[serde(rename = "Utr", default)]
    pub utr: Option<String>,
    #[serde(rename = "ScreenshotURL", default)]
    pub screenshot_url: Option<String>,
    #[serde(rename = "CreatedAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "OrderItems")]
    pub items: Vec<OrderLine>,
    #[serde(rename = "User", default)]
    pub user: Option<OrderUser>,
}

/// One line of a placed order.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderLine {
    #[serde(rename = "ID")]
    pub id: OrderLineId,
    #[serde(rename = "CatalogItemID")]
    pub item_id: ItemId,
    #[serde(rename = "Quantity")]
    pub quantity: u32,
    #[serde(rename = "PriceAtOrder")]
    pub price_at_order: Decimal,
}

/// Owning-user snapshot copied into the order at creation time.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderUser {
    #[serde(rename = "ID")]
    pub id: UserId,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Email")]
    pub email: Email,
}

/// Envelope for order listings.
#[derive(Debug, Deserialize)]
pub struct OrdersEnvelope {
    pub orders: Vec<Order>,
}

/// A status transition: exactly one of the two fields, constrained to the
/// fixed per-field enumerations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusUpdate {
    Status(OrderStatus),
    Payment(PaymentStatus),
}

impl StatusUpdate {
    /// Request body for the backend's status endpoint.
    #[must_use]
    pub fn body(&self) -> serde_json::Value {
        match self {
            Self::Status(status) => serde_json::json!({ "status": status.as_str() }),
            Self::Payment(status) => serde_json::json!({ "payment_status": status.as_str() }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_update_bodies() {
        let body = StatusUpdate::Status(OrderStatus::OutForDelivery).body();
        assert_eq!(body, serde_json::json!({"status": "out_for_delivery"}));

        let body = StatusUpdate::Payment(PaymentStatus::Paid).body();
        assert_eq!(body, serde_json::json!({"payment_status": "paid"}));
    }

    #[test]
    fn test_item_write_serializes_camel_case() {
        let write = ItemWrite {
            name: "Biryani".to_string(),
            description: "Fragrant rice".to_string(),
            price: Decimal::from(180),
            image_url: None,
            is_active: true,
            category: Category::NonVeg,
            section: "Main".to_string(),
        };
        let json = serde_json::to_value(&write).unwrap();
        assert_eq!(json["isActive"], true);
        assert_eq!(json["type"], "Main");
        assert_eq!(json["category"], "non-veg");
        assert!(json["price"].is_number());
    }
}
