//! Session middleware configuration.
//!
//! Sets up in-memory sessions using tower-sessions. The session carries
//! only the bearer token, decoded identity and transient checkout state,
//! so the process-local store is the whole persistence story: a restart
//! logs everyone out, which is the documented lifecycle.

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "tb_session";

/// Create the session layer with the in-memory store.
///
/// The cookie expires with the browser session - there is no silent token
/// refresh, and token expiry is fatal to the session anyway.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MemoryStore> {
    let store = MemoryStore::default();

    let is_secure = config.base_url.starts_with("https://");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnSessionEnd)
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
