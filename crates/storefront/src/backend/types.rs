//! Wire types for the remote ordering backend.
//!
//! This is the single typed deserialization boundary. The backend emits
//! PascalCase keys on reads and accepts camelCase keys on writes; exactly
//! those shapes are (de)serialized here. There is deliberately no aliasing
//! across casing variants — a response in an unexpected shape is a schema
//! error, not something to coalesce silently.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tiffinbox_core::{
    AddressId, Category, Email, ItemId, OrderId, OrderLineId, OrderStatus, PaymentStatus, Role,
    UserId,
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

// =============================================================================
// Users & Addresses
// =============================================================================

/// The authenticated user, with saved addresses.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendUser {
    #[serde(rename = "ID")]
    pub id: UserId,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Email")]
    pub email: Email,
    #[serde(rename = "Picture", default)]
    pub picture: Option<String>,
    #[serde(rename = "Role")]
    pub role: Role,
    #[serde(rename = "Addresses", default)]
    pub addresses: Vec<BackendAddress>,
}

/// A saved delivery address.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendAddress {
    #[serde(rename = "ID")]
    pub id: AddressId,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "Pincode")]
    pub pincode: String,
    #[serde(rename = "Phone")]
    pub phone: String,
}

/// Profile-edit request body.
#[derive(Debug, Serialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub picture: Option<String>,
}

/// Address create/update request body.
///
/// Field validation (required fields, ten-digit phone) happens before this
/// is ever constructed; see `tiffinbox_core::Phone`.
#[derive(Debug, Clone, Serialize)]
pub struct AddressWrite {
    pub name: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub phone: String,
}

// =============================================================================
// Catalog
// =============================================================================

/// A menu item as the backend stores it.
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
    /// Free-text menu section ("Main", "Drink", ...). Display grouping key.
    #[serde(rename = "Type")]
    pub section: String,
    #[serde(rename = "CreatedAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Cart
// =============================================================================

/// One cart line as returned by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct CartEntry {
    #[serde(rename = "ItemID")]
    pub item_id: ItemId,
    #[serde(rename = "Quantity")]
    pub quantity: u32,
}

/// Cart replace-quantity request body. The quantity is absolute, not a
/// delta; zero removes the line.
#[derive(Debug, Serialize)]
pub struct CartUpdate {
    #[serde(rename = "itemId")]
    pub item_id: ItemId,
    pub quantity: u32,
}

/// Quantity map keyed by item id; an absent key means zero.
pub type Quantities = HashMap<ItemId, u32>;

/// Collapse the backend's line list into a quantity map, dropping any
/// zero-quantity lines the backend may still be carrying.
#[must_use]
pub fn quantities_of(entries: Vec<CartEntry>) -> Quantities {
    entries
        .into_iter()
        .filter(|entry| entry.quantity > 0)
        .map(|entry| (entry.item_id, entry.quantity))
        .collect()
}

// =============================================================================
// Orders
// =============================================================================

/// Order creation request: address snapshot, line items and the displayed
/// amount. The backend records its own authoritative amount; this one is
/// what the customer saw.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrder {
    #[serde(rename = "deliveryAddress")]
    pub delivery_address: String,
    pub pincode: String,
    pub phone: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub items: Vec<NewOrderLine>,
}

/// One line of an order creation request.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrderLine {
    #[serde(rename = "catalogItemId")]
    pub item_id: ItemId,
    pub quantity: u32,
    #[serde(rename = "priceAtOrder", with = "rust_decimal::serde::float")]
    pub price_at_order: Decimal,
}

/// Order creation response; only the id matters to the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderCreated {
    #[serde(rename = "ID")]
    pub id: OrderId,
}

/// A placed order.
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
    /// Owning-user snapshot; present on staff listings.
    #[serde(rename = "User", default)]
    pub user: Option<OrderUser>,
}

/// One line of a placed order. `price_at_order` is frozen at creation time
/// and never recomputed from the current catalog price.
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_item_decodes_pascal_case() {
        let json = r#"{
            "ID": 3,
            "Name": "Biryani",
            "Description": "Fragrant rice",
            "Price": 180,
            "ImageURL": "https://img.example/biryani.jpg",
            "IsActive": true,
            "Category": "non-veg",
            "Type": "Main",
            "CreatedAt": "2026-03-01T10:00:00Z"
        }"#;
        let item: MenuItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, ItemId::new(3));
        assert_eq!(item.category, Category::NonVeg);
        assert_eq!(item.section, "Main");
        assert_eq!(item.price, Decimal::from(180));
    }

    #[test]
    fn test_menu_item_rejects_other_casing() {
        // A lowercase shape must be a schema error, not silently coalesced.
        let json = r#"{
            "id": 3,
            "name": "Biryani",
            "description": "Fragrant rice",
            "price": 180,
            "is_active": true,
            "category": "non-veg",
            "type": "Main"
        }"#;
        assert!(serde_json::from_str::<MenuItem>(json).is_err());
    }

    #[test]
    fn test_quantities_of_drops_zero_lines() {
        let entries = vec![
            CartEntry {
                item_id: ItemId::new(1),
                quantity: 2,
            },
            CartEntry {
                item_id: ItemId::new(2),
                quantity: 0,
            },
        ];
        let map = quantities_of(entries);
        assert_eq!(map.get(&ItemId::new(1)), Some(&2));
        assert!(!map.contains_key(&ItemId::new(2)));
    }

    #[test]
    fn test_new_order_serializes_camel_case_numeric_amount() {
        let order = NewOrder {
            delivery_address: "Ravi, Chennai, TN".to_string(),
            pincode: "600001".to_string(),
            phone: "9876543210".to_string(),
            amount: Decimal::from(250),
            items: vec![NewOrderLine {
                item_id: ItemId::new(1),
                quantity: 2,
                price_at_order: Decimal::from(100),
            }],
        };
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["deliveryAddress"], "Ravi, Chennai, TN");
        // Amounts go over the wire as plain numerics, not strings.
        assert!(json["amount"].is_number());
        assert!(json["items"][0]["priceAtOrder"].is_number());
        assert_eq!(json["items"][0]["catalogItemId"], 1);
    }

    #[test]
    fn test_order_decodes_with_optional_user() {
        let json = r#"{
            "ID": 9,
            "Status": "pending",
            "PaymentStatus": "pending",
            "Amount": 250,
            "DeliveryAddress": "Ravi, Chennai, TN",
            "Pincode": "600001",
            "Phone": "9876543210",
            "CreatedAt": "2026-03-01T10:00:00Z",
            "OrderItems": [
                {"ID": 1, "CatalogItemID": 3, "Quantity": 2, "PriceAtOrder": 100}
            ]
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert!(order.user.is_none());
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].price_at_order, Decimal::from(100));
    }
}
