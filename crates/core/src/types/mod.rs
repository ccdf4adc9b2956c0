//! Core types for Tiffinbox.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod category;
pub mod email;
pub mod id;
pub mod money;
pub mod phone;
pub mod status;
pub mod upi;

pub use category::Category;
pub use email::{Email, EmailError};
pub use id::*;
pub use money::Rupees;
pub use phone::{Phone, PhoneError};
pub use status::*;
pub use upi::UpiPaymentRequest;
