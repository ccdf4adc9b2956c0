//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Menu (search + category filter)
//! GET  /health                  - Health check
//!
//! # Auth
//! GET  /login                   - Login page (Google sign-in)
//! POST /auth/google             - Credential exchange (rate limited)
//! POST /logout                  - Logout action
//!
//! # Cart (HTMX fragments)
//! GET  /cart                    - Cart page
//! POST /cart/update             - Absolute quantity (cart_items fragment)
//! POST /cart/adjust             - Increment/decrement (stepper fragment)
//! GET  /cart/count              - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout                - Address selection
//! POST /checkout/address        - Select an existing address
//! POST /checkout/address/new    - Create an address inline and select it
//! GET  /checkout/review         - Invoice review
//! POST /checkout/proceed        - Move to payment
//! GET  /checkout/pay            - UPI payment + proof form
//! POST /checkout/submit         - Create order, attach proof, clear cart
//!
//! # Orders (requires auth)
//! GET  /orders                  - Order history with status filter
//! GET  /orders/{id}/invoice     - Printable invoice
//!
//! # Account (requires auth)
//! GET  /account                 - Profile and addresses
//! POST /account/profile         - Edit display name / avatar
//! POST /account/addresses       - Create address
//! GET  /account/addresses/{id}/edit   - Edit form
//! POST /account/addresses/{id}        - Update address
//! POST /account/addresses/{id}/delete - Delete address
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod menu;
pub mod orders;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page))
        .route(
            "/auth/google",
            post(auth::google_callback).layer(auth_rate_limiter()),
        )
        .route("/logout", post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/update", post(cart::update))
        .route("/adjust", post(cart::adjust))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::select_address_page))
        .route("/address", post(checkout::select_address))
        .route("/address/new", post(checkout::create_address))
        .route("/review", get(checkout::review))
        .route("/proceed", post(checkout::proceed))
        .route("/pay", get(checkout::pay_page))
        .route("/submit", post(checkout::submit))
}

/// Create the orders routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}/invoice", get(orders::invoice))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/profile", post(account::update_profile))
        .route("/addresses", post(account::create_address))
        .route("/addresses/{id}/edit", get(account::edit_address))
        .route("/addresses/{id}", post(account::update_address))
        .route("/addresses/{id}/delete", post(account::delete_address))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Menu is the home page
        .route("/", get(menu::index))
        .merge(auth_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/orders", order_routes())
        .nest("/account", account_routes())
}
