//! HTTP client for the staff surface of the ordering backend.
//!
//! Separate from the storefront's client on purpose: this one reaches the
//! all-orders listing, status transitions and menu writes, none of which
//! the customer binary should be able to call. Nothing here is cached -
//! staff act on what the backend says right now.

pub mod types;

use std::sync::Arc;

use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use tiffinbox_core::{ItemId, OrderFilter, OrderId};

use crate::config::AdminConfig;
use types::{
    BackendUser, ItemWrite, MenuItem, Order, OrdersEnvelope, StatusUpdate, TokenExchange,
    TokenExchangeRequest,
};

/// Errors that can occur when talking to the ordering backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("backend unreachable: {0}")]
    Http(#[from] reqwest::Error),

    /// The bearer token was missing, expired or rejected.
    #[error("backend rejected the bearer token")]
    Unauthorized,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-success response from the backend.
    #[error("backend returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("unexpected response shape: {0}")]
    Schema(String),
}

impl BackendError {
    /// Whether this failure invalidates the session.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Client for the staff surface of the ordering backend.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    http: reqwest::Client,
    base: url::Url,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Panics
    ///
    /// Panics if the reqwest client cannot be constructed (TLS init
    /// failure at startup).
    #[must_use]
    pub fn new(config: &AdminConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.backend_timeout)
            .build()
            .expect("reqwest client construction failed");

        Self {
            inner: Arc::new(BackendClientInner {
                http,
                base: config.backend_url.clone(),
            }),
        }
    }

    fn endpoint(&self, path: &str) -> Result<url::Url, BackendError> {
        self.inner
            .base
            .join(path)
            .map_err(|e| BackendError::Schema(format!("invalid endpoint path {path}: {e}")))
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(BackendError::Unauthorized);
        }
        let message: String = response
            .text()
            .await
            .unwrap_or_default()
            .chars()
            .take(200)
            .collect();
        if status == StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(message));
        }
        Err(BackendError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let response = Self::check_status(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let snippet: String = body.chars().take(200).collect();
            tracing::error!(error = %e, body = %snippet, "Failed to decode backend response");
            BackendError::Schema(format!("{e} (body: {snippet})"))
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, BackendError> {
        let response = self
            .inner
            .http
            .get(self.endpoint(path)?)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: reqwest::Method,
        token: &str,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, BackendError> {
        let response = self
            .inner
            .http
            .request(method, self.endpoint(path)?)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        Self::check_status(response).await
    }

    /// Reachability probe for the readiness endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached.
    pub async fn ping(&self) -> Result<(), BackendError> {
        self.inner.http.get(self.inner.base.clone()).send().await?;
        Ok(())
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Exchange a Google ID token for a backend bearer token and role.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the credential.
    #[instrument(skip(self, id_token))]
    pub async fn login_google(&self, id_token: &str) -> Result<TokenExchange, BackendError> {
        let response = self
            .inner
            .http
            .post(self.endpoint("api/auth/google")?)
            .json(&TokenExchangeRequest {
                id_token: id_token.to_string(),
            })
            .send()
            .await?;
        Self::read_json(response).await
    }

    /// Fetch the authenticated user (for the role check at login).
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip(self, token))]
    pub async fn get_user(&self, token: &str) -> Result<BackendUser, BackendError> {
        self.get_json(token, "api/getUser", &[]).await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// List every order, optionally filtered by status bucket.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn list_all_orders(
        &self,
        token: &str,
        filter: OrderFilter,
    ) -> Result<Vec<Order>, BackendError> {
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(status) = filter.as_query() {
            query.push(("status", status));
        }
        let envelope: OrdersEnvelope = self.get_json(token, "api/orders", &query).await?;
        Ok(envelope.orders)
    }

    /// Fetch a single order by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is unknown or the request fails.
    #[instrument(skip(self, token), fields(order_id = %id))]
    pub async fn get_order(&self, token: &str, id: OrderId) -> Result<Order, BackendError> {
        self.get_json(token, &format!("api/orders/{id}"), &[]).await
    }

    /// Apply one status transition to an order. The caller re-fetches the
    /// order afterwards; the backend's read is what gets rendered.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the transition.
    #[instrument(skip(self, token), fields(order_id = %id))]
    pub async fn update_order_status(
        &self,
        token: &str,
        id: OrderId,
        update: StatusUpdate,
    ) -> Result<(), BackendError> {
        self.send_json(
            reqwest::Method::PUT,
            token,
            &format!("api/orders/{id}/status"),
            &update.body(),
        )
        .await?;
        Ok(())
    }

    // =========================================================================
    // Menu
    // =========================================================================

    /// Fetch the full catalog, inactive items included.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn get_catalog(&self, token: &str) -> Result<Vec<MenuItem>, BackendError> {
        self.get_json(token, "api/getCatalog", &[]).await
    }

    /// Item detail lookup by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the item is unknown or the request fails.
    #[instrument(skip(self, token), fields(item_id = %id))]
    pub async fn get_item(&self, token: &str, id: ItemId) -> Result<MenuItem, BackendError> {
        self.get_json(token, &format!("api/getItem/{id}"), &[])
            .await
    }

    /// Create a menu item.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    #[instrument(skip(self, token, item))]
    pub async fn create_item(&self, token: &str, item: &ItemWrite) -> Result<(), BackendError> {
        self.send_json(reqwest::Method::POST, token, "api/menu", item)
            .await?;
        Ok(())
    }

    /// Update a menu item, including the active flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    #[instrument(skip(self, token, item), fields(item_id = %id))]
    pub async fn update_item(
        &self,
        token: &str,
        id: ItemId,
        item: &ItemWrite,
    ) -> Result<(), BackendError> {
        self.send_json(reqwest::Method::PUT, token, &format!("api/menu/{id}"), item)
            .await?;
        Ok(())
    }
}
