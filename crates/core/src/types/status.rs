//! Status enums for orders and payments, plus the listing filter.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// The backend advances an order pending → received → preparing →
/// out_for_delivery → delivered; cancelled can happen at any point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Received,
    Preparing,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Statuses staff may assign from the order console. `pending` is the
    /// creation-time default and is not assignable by hand.
    pub const ASSIGNABLE: [Self; 5] = [
        Self::Received,
        Self::Preparing,
        Self::OutForDelivery,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Whether the order has reached a terminal state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Wire token for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Received => "received",
            Self::Preparing => "preparing",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Human label ("out for delivery" rather than "out_for_delivery").
    #[must_use]
    pub fn label(self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "received" => Ok(Self::Received),
            "preparing" => Ok(Self::Preparing),
            "out_for_delivery" => Ok(Self::OutForDelivery),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Payment verification status.
///
/// UPI payments are confirmed by hand, so an order starts `pending` and a
/// staff member marks it `paid` or `failed` after checking the transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    /// All payment statuses staff may assign.
    pub const ASSIGNABLE: [Self; 3] = [Self::Pending, Self::Paid, Self::Failed];

    /// Wire token for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("invalid payment status: {s}")),
        }
    }
}

/// Order-listing filter buckets.
///
/// `Open` is a backend-defined bucket ("not yet terminal"); the token is
/// passed through verbatim rather than expanded client-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderFilter {
    #[default]
    All,
    Pending,
    Open,
    Delivered,
    Cancelled,
}

impl OrderFilter {
    /// The fixed filter set, in display order.
    pub const ALL: [Self; 5] = [
        Self::All,
        Self::Pending,
        Self::Open,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Query-string value for the backend, or `None` for the unfiltered
    /// listing (the backend treats a missing `status` as "all").
    #[must_use]
    pub const fn as_query(self) -> Option<&'static str> {
        match self {
            Self::All => None,
            Self::Pending => Some("pending"),
            Self::Open => Some("open"),
            Self::Delivered => Some("delivered"),
            Self::Cancelled => Some("cancelled"),
        }
    }

    /// URL token for this filter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Open => "open",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse a filter token, falling back to `All` for anything unknown so
    /// a hand-edited URL never breaks the listing.
    #[must_use]
    pub fn parse_or_all(s: &str) -> Self {
        match s {
            "pending" => Self::Pending,
            "open" => Self::Open,
            "delivered" => Self::Delivered,
            "cancelled" => Self::Cancelled,
            _ => Self::All,
        }
    }
}

impl std::fmt::Display for OrderFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account role as issued by the backend at token exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Customer,
    Admin,
}

impl Role {
    /// Whether this role may use the staff console.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => f.write_str("customer"),
            Self::Admin => f.write_str("admin"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_wire_tokens() {
        assert_eq!(OrderStatus::OutForDelivery.as_str(), "out_for_delivery");
        assert_eq!(
            "out_for_delivery".parse::<OrderStatus>().unwrap(),
            OrderStatus::OutForDelivery
        );
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_order_status_serde_snake_case() {
        let json = serde_json::to_string(&OrderStatus::OutForDelivery).unwrap();
        assert_eq!(json, "\"out_for_delivery\"");
    }

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Preparing.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
    }

    #[test]
    fn test_assignable_excludes_pending() {
        assert!(!OrderStatus::ASSIGNABLE.contains(&OrderStatus::Pending));
    }

    #[test]
    fn test_label() {
        assert_eq!(OrderStatus::OutForDelivery.label(), "out for delivery");
    }

    #[test]
    fn test_filter_query_values() {
        assert_eq!(OrderFilter::All.as_query(), None);
        assert_eq!(OrderFilter::Open.as_query(), Some("open"));
    }

    #[test]
    fn test_filter_parse_unknown_is_all() {
        assert_eq!(OrderFilter::parse_or_all("bogus"), OrderFilter::All);
        assert_eq!(OrderFilter::parse_or_all("open"), OrderFilter::Open);
    }

    #[test]
    fn test_payment_status_parse() {
        assert_eq!(
            "paid".parse::<PaymentStatus>().unwrap(),
            PaymentStatus::Paid
        );
        assert!("refunded".parse::<PaymentStatus>().is_err());
    }
}
