//! Cart controller.
//!
//! The cart lives server-side, keyed by the user's email; this controller
//! is the mutate-then-re-fetch wrapper around it. Every operation's result
//! is the post-mutation authoritative read, never the echoed request - the
//! backend may clamp a quantity, and the customer must see what it
//! actually recorded.

use tiffinbox_core::ItemId;

use crate::backend::types::Quantities;
use crate::backend::{BackendClient, BackendError};
use crate::models::CurrentUser;

/// What a successful mutation did, for the transient notification. With
/// no optimistic UI there is nothing else to infer the change from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    Added,
    Removed,
    Updated,
}

impl CartChange {
    /// Classify by before/after quantities.
    #[must_use]
    pub const fn classify(previous: u32, current: u32) -> Self {
        if current > previous {
            Self::Added
        } else if current == 0 && previous > 0 {
            Self::Removed
        } else {
            Self::Updated
        }
    }

    /// Notification text.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Added => "Added to cart",
            Self::Removed => "Removed from cart",
            Self::Updated => "Cart updated",
        }
    }
}

/// Outcome of a cart mutation: the authoritative quantity map plus what
/// changed (`None` when the operation was a no-op and no request was
/// issued).
#[derive(Debug)]
pub struct CartOutcome {
    pub quantities: Quantities,
    pub change: Option<CartChange>,
}

/// Cart controller errors.
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    /// The requested quantity was negative. Callers clamp or reject
    /// before any network call is made.
    #[error("quantity cannot be negative")]
    NegativeQuantity,

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Read the authoritative quantity map.
///
/// # Errors
///
/// Returns an error if the backend read fails.
pub async fn quantities(
    backend: &BackendClient,
    user: &CurrentUser,
) -> Result<Quantities, BackendError> {
    backend.get_cart(&user.token, &user.email).await
}

/// Set one line to an absolute quantity, then re-fetch.
///
/// # Errors
///
/// Returns [`CartError::NegativeQuantity`] for a negative target (no
/// request is issued), or a backend error from the write or the re-read.
pub async fn set_quantity(
    backend: &BackendClient,
    user: &CurrentUser,
    item_id: ItemId,
    quantity: i64,
) -> Result<CartOutcome, CartError> {
    let quantity = u32::try_from(quantity).map_err(|_| CartError::NegativeQuantity)?;

    let before = backend.get_cart(&user.token, &user.email).await?;
    let previous = before.get(&item_id).copied().unwrap_or(0);

    apply(backend, user, item_id, previous, quantity).await
}

/// Increment or decrement one line, clamped at zero.
///
/// Decrementing a line already at zero is a no-op: no request is issued
/// and the current map is returned unchanged.
///
/// # Errors
///
/// Returns a backend error from the read, the write, or the re-read.
pub async fn adjust_quantity(
    backend: &BackendClient,
    user: &CurrentUser,
    item_id: ItemId,
    delta: i32,
) -> Result<CartOutcome, CartError> {
    let before = backend.get_cart(&user.token, &user.email).await?;
    let previous = before.get(&item_id).copied().unwrap_or(0);

    let target = i64::from(previous) + i64::from(delta);
    if target < 0 {
        // Clamp at zero; at zero already means nothing to do.
        if previous == 0 {
            return Ok(CartOutcome {
                quantities: before,
                change: None,
            });
        }
        return apply(backend, user, item_id, previous, 0).await;
    }

    let target = u32::try_from(target).unwrap_or(u32::MAX);
    if target == previous {
        return Ok(CartOutcome {
            quantities: before,
            change: None,
        });
    }

    apply(backend, user, item_id, previous, target).await
}

/// Write the absolute quantity, then return the authoritative re-read.
async fn apply(
    backend: &BackendClient,
    user: &CurrentUser,
    item_id: ItemId,
    previous: u32,
    quantity: u32,
) -> Result<CartOutcome, CartError> {
    backend.update_cart(&user.token, item_id, quantity).await?;

    let after = backend.get_cart(&user.token, &user.email).await?;
    let current = after.get(&item_id).copied().unwrap_or(0);

    Ok(CartOutcome {
        quantities: after,
        change: Some(CartChange::classify(previous, current)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_added() {
        assert_eq!(CartChange::classify(0, 1), CartChange::Added);
        assert_eq!(CartChange::classify(2, 3), CartChange::Added);
    }

    #[test]
    fn test_classify_removed() {
        assert_eq!(CartChange::classify(1, 0), CartChange::Removed);
    }

    #[test]
    fn test_classify_updated() {
        assert_eq!(CartChange::classify(3, 2), CartChange::Updated);
        // The backend clamped the write back to the same value; still an
        // update from the customer's point of view.
        assert_eq!(CartChange::classify(2, 2), CartChange::Updated);
    }

    #[test]
    fn test_messages_are_distinct() {
        let messages = [
            CartChange::Added.message(),
            CartChange::Removed.message(),
            CartChange::Updated.message(),
        ];
        assert_eq!(
            messages.len(),
            messages.iter().collect::<std::collections::HashSet<_>>().len()
        );
    }
}
