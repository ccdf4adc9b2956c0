//! HTTP client for the remote ordering backend.
//!
//! # Architecture
//!
//! - The backend is the source of truth for users, menu, cart and orders -
//!   NO local persistence, direct API calls
//! - Every mutating call is followed by an authoritative re-fetch at the
//!   call site; nothing here echoes the request back as if it were state
//! - In-memory caching via `moka` for catalog reads only (item detail
//!   5 minutes, catalog list 1 minute); mutable state is never cached
//!
//! # Example
//!
//! ```rust,ignore
//! use tiffinbox_storefront::backend::BackendClient;
//!
//! let client = BackendClient::new(&config.backend);
//! let exchange = client.login_google("<google id token>").await?;
//! let user = client.get_user(&exchange.token).await?;
//! let menu = client.get_catalog(&exchange.token).await?;
//! ```

pub mod types;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use tiffinbox_core::{AddressId, Email, ItemId, OrderFilter, OrderId};

use crate::config::BackendConfig;
use types::{
    AddressWrite, BackendAddress, BackendUser, CartUpdate, MenuItem, NewOrder, Order, OrderCreated,
    OrdersEnvelope, ProfileUpdate, Quantities, TokenExchange, TokenExchangeRequest, quantities_of,
};

/// Errors that can occur when talking to the ordering backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("backend unreachable: {0}")]
    Http(#[from] reqwest::Error),

    /// The bearer token was missing, expired or rejected. The session must
    /// be cleared and the user sent back to login.
    #[error("backend rejected the bearer token")]
    Unauthorized,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-success response from the backend.
    #[error("backend returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body did not match the expected shape. Unexpected
    /// shapes fail loudly instead of being coalesced across key variants.
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

/// An uploaded payment screenshot, forwarded to the backend as-is.
#[derive(Debug, Clone)]
pub struct ProofImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

// =============================================================================
// BackendClient
// =============================================================================

/// Client for the remote ordering backend.
///
/// Cheaply cloneable; catalog reads are cached, everything else goes to the
/// backend every time.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    http: reqwest::Client,
    base: url::Url,
    items: Cache<ItemId, MenuItem>,
    catalog: Cache<(), Arc<Vec<MenuItem>>>,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Panics
    ///
    /// Panics if the reqwest client cannot be constructed, which only
    /// happens when the TLS backend fails to initialize at startup.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("reqwest client construction failed");

        let items = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300))
            .build();
        let catalog = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(60))
            .build();

        Self {
            inner: Arc::new(BackendClientInner {
                http,
                base: config.base_url.clone(),
                items,
                catalog,
            }),
        }
    }

    fn endpoint(&self, path: &str) -> Result<url::Url, BackendError> {
        self.inner
            .base
            .join(path)
            .map_err(|e| BackendError::Schema(format!("invalid endpoint path {path}: {e}")))
    }

    /// Map a response to a typed body, normalizing failure statuses.
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

    /// Normalize failure statuses into the error taxonomy.
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

    /// Reachability probe for the readiness endpoint. Any response at all
    /// counts; only transport failures do not.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached.
    pub async fn ping(&self) -> Result<(), BackendError> {
        self.inner.http.get(self.inner.base.clone()).send().await?;
        Ok(())
    }

    // =========================================================================
    // Auth & Users
    // =========================================================================

    /// Exchange a Google ID token for a backend bearer token and role.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the credential or the
    /// request fails.
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

    /// Fetch the authenticated user, including saved addresses.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip(self, token))]
    pub async fn get_user(&self, token: &str) -> Result<BackendUser, BackendError> {
        self.get_json(token, "api/getUser", &[]).await
    }

    /// Update the profile display name and avatar.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    #[instrument(skip(self, token))]
    pub async fn update_profile(
        &self,
        token: &str,
        name: &str,
        picture: Option<&str>,
    ) -> Result<(), BackendError> {
        let update = ProfileUpdate {
            name: name.to_string(),
            picture: picture.map(str::to_string),
        };
        self.send_json(reqwest::Method::PUT, token, "api/user/update", &update)
            .await?;
        Ok(())
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// Create a saved address; returns the created record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write (including when a
    /// verification step gates it) or the request fails.
    #[instrument(skip(self, token, address))]
    pub async fn add_address(
        &self,
        token: &str,
        address: &AddressWrite,
    ) -> Result<BackendAddress, BackendError> {
        let response = self
            .send_json(reqwest::Method::POST, token, "api/address", address)
            .await?;
        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| BackendError::Schema(format!("address create response: {e}")))
    }

    /// Update a saved address.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    #[instrument(skip(self, token, address), fields(address_id = %id))]
    pub async fn update_address(
        &self,
        token: &str,
        id: AddressId,
        address: &AddressWrite,
    ) -> Result<(), BackendError> {
        self.send_json(
            reqwest::Method::PUT,
            token,
            &format!("api/address/{id}"),
            address,
        )
        .await?;
        Ok(())
    }

    /// Delete a saved address.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the delete.
    #[instrument(skip(self, token), fields(address_id = %id))]
    pub async fn delete_address(&self, token: &str, id: AddressId) -> Result<(), BackendError> {
        let response = self
            .inner
            .http
            .delete(self.endpoint(&format!("api/address/{id}"))?)
            .bearer_auth(token)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    // =========================================================================
    // Catalog (cached - read-only data)
    // =========================================================================

    /// Fetch the full catalog. Cached for one minute; callers filter the
    /// active flag themselves.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response shape is
    /// unexpected.
    #[instrument(skip(self, token))]
    pub async fn get_catalog(&self, token: &str) -> Result<Arc<Vec<MenuItem>>, BackendError> {
        if let Some(catalog) = self.inner.catalog.get(&()).await {
            debug!("Cache hit for catalog");
            return Ok(catalog);
        }

        let items: Vec<MenuItem> = self.get_json(token, "api/getCatalog", &[]).await?;
        let catalog = Arc::new(items);
        self.inner.catalog.insert((), Arc::clone(&catalog)).await;
        Ok(catalog)
    }

    /// Item detail lookup by id, cached for five minutes. Order-history
    /// rendering funnels every line through this, so one render pass never
    /// fetches the same item twice.
    ///
    /// # Errors
    ///
    /// Returns an error if the item is unknown or the request fails.
    #[instrument(skip(self, token), fields(item_id = %id))]
    pub async fn get_item(&self, token: &str, id: ItemId) -> Result<MenuItem, BackendError> {
        if let Some(item) = self.inner.items.get(&id).await {
            debug!("Cache hit for item");
            return Ok(item);
        }

        let item: MenuItem = self
            .get_json(token, &format!("api/getItem/{id}"), &[])
            .await?;
        self.inner.items.insert(id, item.clone()).await;
        Ok(item)
    }

    /// Drop all cached catalog data.
    pub async fn invalidate_catalog(&self) {
        self.inner.catalog.invalidate_all();
        self.inner.items.invalidate_all();
        self.inner.catalog.run_pending_tasks().await;
        self.inner.items.run_pending_tasks().await;
    }

    // =========================================================================
    // Cart (never cached - mutable state)
    // =========================================================================

    /// Read the authoritative quantity map for a user's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(email = %email))]
    pub async fn get_cart(&self, token: &str, email: &Email) -> Result<Quantities, BackendError> {
        let entries: Vec<types::CartEntry> = self
            .get_json(token, "api/cart/items", &[("email", email.as_str())])
            .await?;
        Ok(quantities_of(entries))
    }

    /// Replace one line's quantity with an absolute value. Zero removes
    /// the line. The caller must re-read the cart afterwards; the backend
    /// is authoritative for the final quantity.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    #[instrument(skip(self, token), fields(item_id = %item_id, quantity = quantity))]
    pub async fn update_cart(
        &self,
        token: &str,
        item_id: ItemId,
        quantity: u32,
    ) -> Result<(), BackendError> {
        let update = CartUpdate { item_id, quantity };
        self.send_json(reqwest::Method::POST, token, "api/cart/update", &update)
            .await?;
        Ok(())
    }

    /// Remove every line from a user's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the clear.
    #[instrument(skip(self, token), fields(email = %email))]
    pub async fn clear_cart(&self, token: &str, email: &Email) -> Result<(), BackendError> {
        let response = self
            .inner
            .http
            .delete(self.endpoint("api/cart/items")?)
            .bearer_auth(token)
            .query(&[("email", email.as_str())])
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Create an order; returns the new order id. Must complete before
    /// proof attachment or cart clearing is attempted.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the order.
    #[instrument(skip(self, token, order))]
    pub async fn create_order(
        &self,
        token: &str,
        order: &NewOrder,
    ) -> Result<OrderId, BackendError> {
        let response = self
            .send_json(reqwest::Method::POST, token, "api/orders", order)
            .await?;
        let body = response.text().await?;
        let created: OrderCreated = serde_json::from_str(&body)
            .map_err(|e| BackendError::Schema(format!("order create response: {e}")))?;
        Ok(created.id)
    }

    /// Attach manual payment proof (UTR reference and/or screenshot) to an
    /// existing order.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload fails.
    #[instrument(skip(self, token, utr, screenshot), fields(order_id = %order_id))]
    pub async fn attach_payment_proof(
        &self,
        token: &str,
        order_id: OrderId,
        utr: Option<&str>,
        screenshot: Option<ProofImage>,
    ) -> Result<(), BackendError> {
        let mut form = reqwest::multipart::Form::new();
        if let Some(utr) = utr {
            form = form.text("utr", utr.to_string());
        }
        if let Some(image) = screenshot {
            let part = reqwest::multipart::Part::bytes(image.bytes)
                .file_name(image.file_name)
                .mime_str(&image.content_type)
                .map_err(|e| BackendError::Schema(format!("screenshot mime type: {e}")))?;
            form = form.part("screenshot", part);
        }

        let response = self
            .inner
            .http
            .post(self.endpoint(&format!("api/orders/{order_id}/proof"))?)
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// List the authenticated user's orders, optionally filtered by the
    /// backend-defined status buckets.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn list_my_orders(
        &self,
        token: &str,
        filter: OrderFilter,
    ) -> Result<Vec<Order>, BackendError> {
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(status) = filter.as_query() {
            query.push(("status", status));
        }
        let envelope: OrdersEnvelope = self.get_json(token, "api/orders/user", &query).await?;
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
}
