//! UPI payment request payload.
//!
//! Checkout presents a scannable `upi://pay` deep link built entirely from
//! data the client already holds (payee VPA, display name, invoice total).
//! Building the link performs no network call; the QR is rendered from the
//! link on the client.

use serde::{Deserialize, Serialize};

use crate::types::money::Rupees;

/// A manual UPI bank-transfer request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpiPaymentRequest {
    /// Payee virtual payment address (e.g. "kitchen@upi").
    pub vpa: String,
    /// Payee display name shown in the paying app.
    pub payee_name: String,
    /// Amount to request.
    pub amount: Rupees,
}

impl UpiPaymentRequest {
    /// Create a payment request.
    #[must_use]
    pub const fn new(vpa: String, payee_name: String, amount: Rupees) -> Self {
        Self {
            vpa,
            payee_name,
            amount,
        }
    }

    /// The `upi://pay` deep link for this request.
    ///
    /// Percent-encodes the VPA and payee name; the amount is always sent
    /// with two decimal places and the currency is fixed to INR.
    #[must_use]
    pub fn deep_link(&self) -> String {
        format!(
            "upi://pay?pa={}&pn={}&am={}&cu=INR",
            urlencoding::encode(&self.vpa),
            urlencoding::encode(&self.payee_name),
            self.amount.plain(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_link_format() {
        let request = UpiPaymentRequest::new(
            "kitchen@upi".to_string(),
            "Cloud Kitchen".to_string(),
            Rupees::from_whole(250),
        );
        assert_eq!(
            request.deep_link(),
            "upi://pay?pa=kitchen%40upi&pn=Cloud%20Kitchen&am=250.00&cu=INR"
        );
    }

    #[test]
    fn test_deep_link_encodes_payee_name() {
        let request = UpiPaymentRequest::new(
            "a@b".to_string(),
            "Ravi & Sons".to_string(),
            Rupees::from_whole(1),
        );
        let link = request.deep_link();
        assert!(link.contains("pn=Ravi%20%26%20Sons"), "{link}");
        assert!(link.ends_with("&am=1.00&cu=INR"));
    }
}
