//! Domain models for storefront.
//!
//! Session-held state only: the logged-in identity and the in-progress
//! checkout. Everything durable lives in the backend and is re-fetched,
//! never mirrored here.

pub mod checkout;
pub mod session;

pub use checkout::{AddressSnapshot, CheckoutStage, CheckoutState, CheckoutStep, Invoice, InvoiceLine};
pub use session::{CurrentUser, keys as session_keys};
