//! Session-related types.

use serde::{Deserialize, Serialize};

use tiffinbox_core::{Email, Role};

/// Session-stored staff identity.
///
/// Only stored after the role check at login; the extractor re-checks the
/// role anyway so a stale customer session can never reach staff views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Bearer token issued by the backend at login.
    pub token: String,
    /// Email claim.
    pub email: Email,
    /// Display name claim.
    pub name: String,
    /// Role issued by the backend alongside the token.
    pub role: Role,
}

/// Session keys for stored state.
pub mod keys {
    /// Key for storing the current logged-in staff member.
    pub const CURRENT_ADMIN: &str = "current_admin";
}
