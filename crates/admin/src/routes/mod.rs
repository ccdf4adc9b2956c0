//! HTTP route handlers for the admin console.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                     - Redirect to /orders
//! GET  /health               - Health check
//!
//! # Auth
//! GET  /login                - Login page (Google sign-in, admin only)
//! POST /auth/google          - Credential exchange + role check
//! POST /logout               - Logout action
//!
//! # Orders
//! GET  /orders               - All orders with status filter
//! POST /orders/{id}/status   - One status transition (order card fragment)
//!
//! # Menu
//! GET  /menu                 - Full catalog, inactive items included
//! GET  /menu/new             - Create form
//! POST /menu                 - Create item
//! GET  /menu/{id}/edit       - Edit form
//! POST /menu/{id}            - Update item (including active flag)
//! ```

pub mod auth;
pub mod menu;
pub mod orders;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use crate::state::AppState;

/// Create all routes for the admin console.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/orders") }))
        .route("/login", get(auth::login_page))
        .route("/auth/google", post(auth::google_callback))
        .route("/logout", post(auth::logout))
        .route("/orders", get(orders::index))
        .route("/orders/{id}/status", post(orders::update_status))
        .route("/menu", get(menu::index).post(menu::create))
        .route("/menu/new", get(menu::new_form))
        .route("/menu/{id}/edit", get(menu::edit_form))
        .route("/menu/{id}", post(menu::update))
}
