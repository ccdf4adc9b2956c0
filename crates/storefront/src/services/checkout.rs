//! Checkout orchestration.
//!
//! Order submission is one logical transaction made of three sequential
//! network effects: create the order, attach the payment proof, clear the
//! cart. They are NOT atomic and there is no compensating transaction, so
//! the rules here are strict:
//!
//! - order creation must return an id before anything else runs
//! - each step failure is reported as that step, never a blanket error
//! - a step that already succeeded is never re-run on retry (the order id
//!   and the proof-attached flag are pinned in the session state)
//! - nothing retries automatically; the customer retries by resubmitting

use rust_decimal::Decimal;

use tiffinbox_core::OrderId;

use crate::backend::types::{NewOrder, NewOrderLine, Quantities};
use crate::backend::{BackendClient, BackendError, ProofImage};
use crate::models::checkout::{CheckoutState, CheckoutStep, Invoice, InvoiceLine};
use crate::models::session::CurrentUser;

/// Manual payment evidence supplied by the customer.
#[derive(Debug, Default)]
pub struct Proof {
    pub utr: Option<String>,
    pub screenshot: Option<ProofImage>,
}

impl Proof {
    /// At least one proof mechanism is required before submission.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.utr.is_none() && self.screenshot.is_none()
    }
}

/// Order submission failed.
#[derive(Debug, thiserror::Error)]
pub enum PlaceOrderError {
    /// The session lost its address or invoice snapshot mid-checkout;
    /// nothing was sent to the backend.
    #[error("checkout state is incomplete: {0}")]
    Incomplete(&'static str),

    /// A submission step failed after zero or more earlier steps
    /// succeeded. Carries which step failed and the order id when one
    /// already exists, so the UI can explain exactly what happened and a
    /// retry resumes without re-creating the order.
    #[error("failed while {} (order id: {order_id:?}): {source}", step.describe())]
    Step {
        step: CheckoutStep,
        order_id: Option<OrderId>,
        #[source]
        source: BackendError,
    },
}

/// Build the displayed invoice from the authoritative cart, pricing each
/// line at the current catalog price.
///
/// Lines come out sorted by item id so renders are stable. An item the
/// backend no longer knows fails the build; an unpriceable line cannot be
/// checked out.
///
/// # Errors
///
/// Returns an error if any item lookup fails.
pub async fn build_invoice(
    backend: &BackendClient,
    user: &CurrentUser,
    quantities: &Quantities,
) -> Result<Invoice, BackendError> {
    let mut entries: Vec<_> = quantities
        .iter()
        .map(|(id, qty)| (*id, *qty))
        .collect();
    entries.sort_by_key(|(id, _)| *id);

    let mut lines = Vec::with_capacity(entries.len());
    for (item_id, quantity) in entries {
        if quantity == 0 {
            continue;
        }
        let item = backend.get_item(&user.token, item_id).await?;
        lines.push(InvoiceLine {
            item_id,
            name: item.name,
            unit_price: item.price,
            quantity,
        });
    }

    Ok(Invoice::new(lines))
}

/// Run the order-submission sequence, resuming a previous attempt where it
/// left off.
///
/// # Errors
///
/// Returns a [`PlaceOrderError`] naming the failed step; the state is
/// moved to `Failed(step)` and keeps whatever already succeeded.
pub async fn place_order(
    backend: &BackendClient,
    user: &CurrentUser,
    state: &mut CheckoutState,
    proof: Proof,
) -> Result<OrderId, PlaceOrderError> {
    // Step (a): create the order - unless an earlier attempt already did.
    let order_id = match state.created_order {
        Some(id) => id,
        None => {
            let Some(address) = state.address.clone() else {
                return Err(PlaceOrderError::Incomplete("no delivery address"));
            };
            let Some(invoice) = state.invoice.clone() else {
                return Err(PlaceOrderError::Incomplete("no invoice"));
            };
            let payload = order_payload(&address, &invoice);
            match backend.create_order(&user.token, &payload).await {
                Ok(id) => {
                    state.record_order(id);
                    tracing::info!(order_id = %id, "Order created");
                    id
                }
                Err(source) => {
                    state.fail(CheckoutStep::CreateOrder);
                    return Err(PlaceOrderError::Step {
                        step: CheckoutStep::CreateOrder,
                        order_id: None,
                        source,
                    });
                }
            }
        }
    };

    // Step (b): attach the proof - skipped when a previous attempt got it
    // through.
    if !state.proof_attached {
        if let Err(source) = backend
            .attach_payment_proof(
                &user.token,
                order_id,
                proof.utr.as_deref(),
                proof.screenshot,
            )
            .await
        {
            state.fail(CheckoutStep::AttachProof);
            return Err(PlaceOrderError::Step {
                step: CheckoutStep::AttachProof,
                order_id: Some(order_id),
                source,
            });
        }
        state.proof_attached = true;
    }

    // Step (c): clear the cart.
    if let Err(source) = backend.clear_cart(&user.token, &user.email).await {
        state.fail(CheckoutStep::ClearCart);
        return Err(PlaceOrderError::Step {
            step: CheckoutStep::ClearCart,
            order_id: Some(order_id),
            source,
        });
    }

    state.complete();
    Ok(order_id)
}

/// Assemble the creation payload from the pinned address and invoice
/// snapshots - exactly the lines and total the customer was shown.
fn order_payload(address: &crate::models::checkout::AddressSnapshot, invoice: &Invoice) -> NewOrder {
    NewOrder {
        delivery_address: address.delivery_line(),
        pincode: address.pincode.clone(),
        phone: address.phone.clone(),
        amount: invoice.total().amount(),
        items: invoice
            .lines
            .iter()
            .map(|line| NewOrderLine {
                item_id: line.item_id,
                quantity: line.quantity,
                price_at_order: line.unit_price,
            })
            .collect(),
    }
}

/// The displayed invoice total for an order-history entry, computed from
/// the frozen price-at-order values - never from current catalog prices.
#[must_use]
pub fn historical_total(lines: &[crate::backend::types::OrderLine]) -> Decimal {
    lines
        .iter()
        .map(|line| line.price_at_order * Decimal::from(line.quantity))
        .sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::types::OrderLine;
    use crate::models::checkout::AddressSnapshot;
    use tiffinbox_core::{AddressId, ItemId, OrderLineId};

    fn ready_state() -> CheckoutState {
        let mut state = CheckoutState::new();
        state
            .select_address(AddressSnapshot {
                id: AddressId::new(1),
                name: "Ravi".to_string(),
                city: "Chennai".to_string(),
                state: "TN".to_string(),
                pincode: "600001".to_string(),
                phone: "9876543210".to_string(),
            })
            .unwrap();
        state
            .set_invoice(Invoice::new(vec![
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
            ]))
            .unwrap();
        state
    }

    #[test]
    fn test_order_payload_snapshots_address_and_lines() {
        let state = ready_state();
        let payload = order_payload(
            state.address.as_ref().unwrap(),
            state.invoice.as_ref().unwrap(),
        );
        assert_eq!(payload.delivery_address, "Ravi, Chennai, TN");
        assert_eq!(payload.pincode, "600001");
        assert_eq!(payload.phone, "9876543210");
        assert_eq!(payload.amount, Decimal::from(250));
        assert_eq!(payload.items.len(), 2);
        assert_eq!(payload.items[0].price_at_order, Decimal::from(100));
        assert_eq!(payload.items[0].quantity, 2);
    }

    #[test]
    fn test_proof_emptiness() {
        assert!(Proof::default().is_empty());
        let with_utr = Proof {
            utr: Some("UTR123".to_string()),
            screenshot: None,
        };
        assert!(!with_utr.is_empty());
    }

    #[test]
    fn test_historical_total_uses_price_at_order() {
        // Catalog price may have changed since; the export must not care.
        let lines = vec![
            OrderLine {
                id: OrderLineId::new(1),
                item_id: ItemId::new(1),
                quantity: 2,
                price_at_order: Decimal::from(90),
            },
            OrderLine {
                id: OrderLineId::new(2),
                item_id: ItemId::new(2),
                quantity: 1,
                price_at_order: Decimal::from(50),
            },
        ];
        assert_eq!(historical_total(&lines), Decimal::from(230));
    }
}
