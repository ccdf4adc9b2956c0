//! Tiffinbox Core - Shared types library.
//!
//! This crate provides common types used across all Tiffinbox components:
//! - `storefront` - Customer-facing ordering site
//! - `admin` - Staff console for order and menu management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Every
//! durable entity lives in the remote ordering backend; these types are the
//! client-side projections of that state plus the few purely client-local
//! concepts (UPI payment payloads, status filters).
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, phone numbers,
//!   emails, statuses, and the UPI deep-link payload

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
