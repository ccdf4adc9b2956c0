//! Session-related types.
//!
//! Types stored in the session for authentication state. The session is
//! the only client-side lifetime: set at login, cleared at logout or on
//! the first authorization failure from the backend.

use serde::{Deserialize, Serialize};

use tiffinbox_core::{Email, Role};

/// Session-stored user identity.
///
/// The bearer token plus the identity claims decoded from the login
/// credential. Passed explicitly to every call that needs it; there is no
/// ambient token lookup anywhere else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Bearer token issued by the backend at login.
    pub token: String,
    /// Email claim; also the cart key on the wire.
    pub email: Email,
    /// Display name claim.
    pub name: String,
    /// Avatar URL claim, when the identity provider supplied one.
    pub picture: Option<String>,
    /// Role issued by the backend alongside the token.
    pub role: Role,
}

/// Session keys for stored state.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the in-progress checkout state machine.
    pub const CHECKOUT: &str = "checkout";

    /// Key for the one-shot notice shown on the next page load.
    pub const FLASH: &str = "flash";
}
