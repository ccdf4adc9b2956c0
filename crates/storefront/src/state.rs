//! Application state shared across handlers.

use std::sync::Arc;

use crate::backend::BackendClient;
use crate::config::StorefrontConfig;
use crate::search::MenuIndex;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; holds the configuration, the backend
/// client and the menu search index. There is no database pool - the
/// backend owns all durable state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    backend: BackendClient,
    search: MenuIndex,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let backend = BackendClient::new(&config.backend);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                search: MenuIndex::new(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the ordering backend client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Get a reference to the menu search index.
    #[must_use]
    pub fn search(&self) -> &MenuIndex {
        &self.inner.search
    }
}
