//! Checkout state machine.
//!
//! Checkout is a linear, mostly-irreversible workflow spread over several
//! page views, so its state lives in the session between requests:
//!
//! ```text
//! SelectingAddress → ReviewingInvoice → AwaitingPaymentProof
//!     → SubmittingOrder → Completed
//! ```
//!
//! `Failed(step)` is reachable from submission and re-enters the proof
//! step on retry. There is no compensating transaction: once the order is
//! created its id is pinned here, and a retry resumes at the step that
//! failed instead of creating a second order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tiffinbox_core::{AddressId, ItemId, OrderId, Rupees};

/// The three sequential network effects of order submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckoutStep {
    CreateOrder,
    AttachProof,
    ClearCart,
}

impl CheckoutStep {
    /// What the step was doing, for the per-step failure message.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::CreateOrder => "creating the order",
            Self::AttachProof => "attaching the payment proof",
            Self::ClearCart => "clearing the cart",
        }
    }
}

/// Where the workflow currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckoutStage {
    SelectingAddress,
    ReviewingInvoice,
    AwaitingPaymentProof,
    SubmittingOrder,
    Completed,
    Failed(CheckoutStep),
}

/// Delivery address snapshot taken at selection time.
///
/// The snapshot, not a live reference, goes into the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressSnapshot {
    pub id: AddressId,
    pub name: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub phone: String,
}

impl AddressSnapshot {
    /// One-line rendering used as the order's delivery address field.
    #[must_use]
    pub fn delivery_line(&self) -> String {
        format!("{}, {}, {}", self.name, self.city, self.state)
    }
}

/// One displayed invoice line, priced at the current catalog price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub item_id: ItemId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl InvoiceLine {
    /// Line total (unit price × quantity).
    #[must_use]
    pub fn total(&self) -> Rupees {
        Rupees::new(self.unit_price).times(self.quantity)
    }
}

/// The invoice as displayed to the customer.
///
/// Computed client-side for display; the backend records the authoritative
/// amount at order creation. Creation passes exactly these lines so the
/// two cannot diverge in practice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Invoice {
    pub lines: Vec<InvoiceLine>,
}

impl Invoice {
    /// Build an invoice from lines.
    #[must_use]
    pub const fn new(lines: Vec<InvoiceLine>) -> Self {
        Self { lines }
    }

    /// Σ(current catalog price × quantity) over all lines.
    #[must_use]
    pub fn total(&self) -> Rupees {
        self.lines.iter().map(InvoiceLine::total).sum()
    }

    /// Whether there is anything to pay for.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Illegal transition attempts.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CheckoutFlowError {
    #[error("an order has already been created for this checkout")]
    AddressLocked,
    #[error("select a delivery address first")]
    NoAddress,
    #[error("the cart is empty")]
    EmptyInvoice,
    #[error("checkout is not at the payment step")]
    NotAtPayment,
}

/// The session-held checkout state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutState {
    pub stage: CheckoutStage,
    pub address: Option<AddressSnapshot>,
    pub invoice: Option<Invoice>,
    /// Pinned once order creation succeeds; a retry after a later-step
    /// failure reuses this id and never re-creates the order.
    pub created_order: Option<OrderId>,
    /// Set once proof attachment succeeds, so a retry after a cart-clear
    /// failure does not re-run the already-succeeded step.
    #[serde(default)]
    pub proof_attached: bool,
}

impl Default for CheckoutState {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutState {
    /// Start a fresh checkout at address selection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stage: CheckoutStage::SelectingAddress,
            address: None,
            invoice: None,
            created_order: None,
            proof_attached: false,
        }
    }

    /// Select the delivery address. Allowed any time before an order
    /// exists; the snapshot is frozen once creation succeeded.
    ///
    /// # Errors
    ///
    /// Returns an error if an order has already been created.
    pub fn select_address(&mut self, address: AddressSnapshot) -> Result<(), CheckoutFlowError> {
        if self.created_order.is_some() {
            return Err(CheckoutFlowError::AddressLocked);
        }
        self.address = Some(address);
        self.stage = CheckoutStage::ReviewingInvoice;
        Ok(())
    }

    /// Refresh the displayed invoice. Called on every review render, so a
    /// cart edited mid-checkout simply shows the smaller total.
    ///
    /// # Errors
    ///
    /// Returns an error if no address has been selected yet, or if an
    /// order has already been created (the lines are frozen with it).
    pub fn set_invoice(&mut self, invoice: Invoice) -> Result<(), CheckoutFlowError> {
        if self.address.is_none() {
            return Err(CheckoutFlowError::NoAddress);
        }
        if self.created_order.is_some() {
            return Err(CheckoutFlowError::AddressLocked);
        }
        self.invoice = Some(invoice);
        self.stage = CheckoutStage::ReviewingInvoice;
        Ok(())
    }

    /// Whether the proceed control is enabled: an address is selected and
    /// the invoice is non-empty.
    #[must_use]
    pub fn can_proceed(&self) -> bool {
        self.address.is_some() && self.invoice.as_ref().is_some_and(|inv| !inv.is_empty())
    }

    /// Move to the payment/proof step.
    ///
    /// # Errors
    ///
    /// Returns an error if no address is selected or the invoice is empty.
    pub fn proceed_to_payment(&mut self) -> Result<(), CheckoutFlowError> {
        if self.address.is_none() {
            return Err(CheckoutFlowError::NoAddress);
        }
        if !self.invoice.as_ref().is_some_and(|inv| !inv.is_empty()) {
            return Err(CheckoutFlowError::EmptyInvoice);
        }
        self.stage = CheckoutStage::AwaitingPaymentProof;
        Ok(())
    }

    /// Enter submission. Valid from the proof step, or from a failed
    /// submission being retried.
    ///
    /// # Errors
    ///
    /// Returns an error if checkout is not at the payment step.
    pub fn begin_submit(&mut self) -> Result<(), CheckoutFlowError> {
        match self.stage {
            CheckoutStage::AwaitingPaymentProof | CheckoutStage::Failed(_) => {
                self.stage = CheckoutStage::SubmittingOrder;
                Ok(())
            }
            _ => Err(CheckoutFlowError::NotAtPayment),
        }
    }

    /// Pin the created order id.
    pub const fn record_order(&mut self, id: OrderId) {
        self.created_order = Some(id);
    }

    /// Record a failed submission step; retry re-enters the proof step.
    pub const fn fail(&mut self, step: CheckoutStep) {
        self.stage = CheckoutStage::Failed(step);
    }

    /// Mark the workflow complete.
    pub const fn complete(&mut self) {
        self.stage = CheckoutStage::Completed;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tiffinbox_core::Rupees;

    fn address() -> AddressSnapshot {
        AddressSnapshot {
            id: AddressId::new(1),
            name: "Ravi".to_string(),
            city: "Chennai".to_string(),
            state: "TN".to_string(),
            pincode: "600001".to_string(),
            phone: "9876543210".to_string(),
        }
    }

    fn invoice() -> Invoice {
        Invoice::new(vec![
            InvoiceLine {
                item_id: ItemId::new(1),
                name: "Item A".to_string(),
                unit_price: Decimal::from(100),
                quantity: 2,
            },
            InvoiceLine {
                item_id: ItemId::new(2),
                name: "Item B".to_string(),
                unit_price: Decimal::from(50),
                quantity: 1,
            },
        ])
    }

    #[test]
    fn test_invoice_total() {
        // Two lines: 2 × ₹100 + 1 × ₹50 = ₹250.
        assert_eq!(invoice().total(), Rupees::from_whole(250));
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut state = CheckoutState::new();
        assert!(!state.can_proceed());

        state.select_address(address()).unwrap();
        assert_eq!(state.stage, CheckoutStage::ReviewingInvoice);
        assert!(!state.can_proceed());

        state.set_invoice(invoice()).unwrap();
        assert!(state.can_proceed());

        state.proceed_to_payment().unwrap();
        assert_eq!(state.stage, CheckoutStage::AwaitingPaymentProof);

        state.begin_submit().unwrap();
        state.record_order(OrderId::new(7));
        state.complete();
        assert_eq!(state.stage, CheckoutStage::Completed);
    }

    #[test]
    fn test_proceed_requires_address_and_lines() {
        let mut state = CheckoutState::new();
        assert_eq!(
            state.proceed_to_payment(),
            Err(CheckoutFlowError::NoAddress)
        );

        state.select_address(address()).unwrap();
        state.set_invoice(Invoice::default()).unwrap();
        assert!(!state.can_proceed());
        assert_eq!(
            state.proceed_to_payment(),
            Err(CheckoutFlowError::EmptyInvoice)
        );
    }

    #[test]
    fn test_submit_only_from_payment_or_failure() {
        let mut state = CheckoutState::new();
        assert_eq!(state.begin_submit(), Err(CheckoutFlowError::NotAtPayment));

        state.select_address(address()).unwrap();
        state.set_invoice(invoice()).unwrap();
        state.proceed_to_payment().unwrap();
        state.begin_submit().unwrap();

        // A failure re-enters submission on retry.
        state.fail(CheckoutStep::AttachProof);
        assert!(state.begin_submit().is_ok());
    }

    #[test]
    fn test_address_frozen_after_order_created() {
        let mut state = CheckoutState::new();
        state.select_address(address()).unwrap();
        state.set_invoice(invoice()).unwrap();
        state.proceed_to_payment().unwrap();
        state.begin_submit().unwrap();
        state.record_order(OrderId::new(7));
        state.fail(CheckoutStep::ClearCart);

        assert_eq!(
            state.select_address(address()),
            Err(CheckoutFlowError::AddressLocked)
        );
        assert_eq!(
            state.set_invoice(invoice()),
            Err(CheckoutFlowError::AddressLocked)
        );
        // The pinned id survives the failure for the retry.
        assert_eq!(state.created_order, Some(OrderId::new(7)));
    }

    #[test]
    fn test_mid_checkout_cart_shrink_updates_invoice() {
        let mut state = CheckoutState::new();
        state.select_address(address()).unwrap();
        state.set_invoice(invoice()).unwrap();

        let smaller = Invoice::new(vec![InvoiceLine {
            item_id: ItemId::new(1),
            name: "Item A".to_string(),
            unit_price: Decimal::from(100),
            quantity: 1,
        }]);
        state.set_invoice(smaller).unwrap();
        assert_eq!(
            state.invoice.as_ref().unwrap().total(),
            Rupees::from_whole(100)
        );
    }
}
