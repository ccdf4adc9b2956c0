//! Monetary amounts in the single implied currency (Indian rupees).
//!
//! The backend transmits amounts as plain numerics with no currency code;
//! the client is responsible for symbol display only. Decimal arithmetic
//! avoids the float rounding a price like 49.95 would otherwise pick up.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A rupee amount.
///
/// Wraps a [`Decimal`] so cart and invoice totals are exact. Serializes
/// transparently as the plain numeric the backend expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Rupees(Decimal);

impl Rupees {
    /// Zero rupees.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create an amount from a decimal value.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create an amount from whole rupees.
    #[must_use]
    pub fn from_whole(rupees: i64) -> Self {
        Self(Decimal::from(rupees))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether this amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Line total: unit price times a quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Fixed two-decimal rendering without the currency symbol, as UPI
    /// deep links and wire payloads want it (e.g. "250.00").
    #[must_use]
    pub fn plain(&self) -> String {
        format!("{:.2}", self.0)
    }
}

impl Add for Rupees {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Rupees {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Rupees {
    /// Symbol display: whole amounts render without a fraction ("₹250"),
    /// fractional amounts with two places ("₹49.95").
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract().is_zero() {
            write!(f, "₹{}", self.0.trunc())
        } else {
            write!(f, "₹{:.2}", self.0)
        }
    }
}

impl From<Decimal> for Rupees {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_display_whole() {
        assert_eq!(Rupees::from_whole(250).to_string(), "₹250");
    }

    #[test]
    fn test_display_fractional() {
        let amount = Rupees::new(Decimal::from_str("49.95").unwrap());
        assert_eq!(amount.to_string(), "₹49.95");
    }

    #[test]
    fn test_times_and_sum() {
        let a = Rupees::from_whole(100).times(2);
        let b = Rupees::from_whole(50).times(1);
        let total: Rupees = [a, b].into_iter().sum();
        assert_eq!(total, Rupees::from_whole(250));
    }

    #[test]
    fn test_plain_is_two_decimal() {
        assert_eq!(Rupees::from_whole(250).plain(), "250.00");
        let amount = Rupees::new(Decimal::from_str("19.5").unwrap());
        assert_eq!(amount.plain(), "19.50");
    }

    #[test]
    fn test_serde_transparent() {
        let amount = Rupees::new(Decimal::from_str("12.50").unwrap());
        let json = serde_json::to_string(&amount).unwrap();
        let back: Rupees = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
    }

    #[test]
    fn test_deserialize_plain_number() {
        // The backend sends bare numerics.
        let amount: Rupees = serde_json::from_str("100").unwrap();
        assert_eq!(amount, Rupees::from_whole(100));
    }
}
