//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TIFFINBOX_BACKEND_URL` - Base URL of the remote ordering backend.
//!   The backend location is deployment configuration: exactly one
//!   canonical endpoint set, never a per-view choice.
//! - `TIFFINBOX_UPI_VPA` - UPI virtual payment address payments go to
//! - `TIFFINBOX_UPI_PAYEE` - Payee display name shown in UPI apps
//!
//! ## Optional
//! - `TIFFINBOX_HOST` - Bind address (default: 127.0.0.1)
//! - `TIFFINBOX_PORT` - Listen port (default: 3000)
//! - `TIFFINBOX_BASE_URL` - Public URL (default: http://localhost:3000)
//! - `TIFFINBOX_BACKEND_TIMEOUT_SECS` - Backend request timeout (default: 15)
//! - `GOOGLE_CLIENT_ID` - Google Identity Services client id for the
//!   sign-in button (default: empty, button renders disabled)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Remote ordering backend configuration
    pub backend: BackendConfig,
    /// UPI payee configuration for checkout
    pub upi: UpiConfig,
    /// Google Identity Services client id for the sign-in button
    pub google_client_id: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Remote ordering backend configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Backend base URL (e.g. <https://kitchen-backend.fly.dev/>)
    pub base_url: Url,
    /// Per-request timeout. A hung request must resolve into a retryable
    /// failure instead of leaving its control disabled forever.
    pub timeout: Duration,
}

/// UPI payee configuration.
#[derive(Debug, Clone)]
pub struct UpiConfig {
    /// Virtual payment address payments go to (e.g. "kitchen@upi")
    pub vpa: String,
    /// Payee display name shown in the paying app
    pub payee_name: String,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("TIFFINBOX_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("TIFFINBOX_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("TIFFINBOX_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("TIFFINBOX_PORT".to_string(), e.to_string()))?;
        let base_url = get_env_or_default("TIFFINBOX_BASE_URL", "http://localhost:3000");

        Ok(Self {
            host,
            port,
            base_url,
            backend: BackendConfig::from_env()?,
            upi: UpiConfig::from_env()?,
            google_client_id: get_env_or_default("GOOGLE_CLIENT_ID", ""),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl BackendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = get_required_env("TIFFINBOX_BACKEND_URL")?;
        let base_url = Url::parse(&raw).map_err(|e| {
            ConfigError::InvalidEnvVar("TIFFINBOX_BACKEND_URL".to_string(), e.to_string())
        })?;

        let timeout_secs = get_env_or_default("TIFFINBOX_BACKEND_TIMEOUT_SECS", "15")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("TIFFINBOX_BACKEND_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl UpiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            vpa: get_required_env("TIFFINBOX_UPI_VPA")?,
            payee_name: get_required_env("TIFFINBOX_UPI_PAYEE")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            backend: BackendConfig {
                base_url: Url::parse("https://backend.example.com/").unwrap(),
                timeout: Duration::from_secs(15),
            },
            upi: UpiConfig {
                vpa: "kitchen@upi".to_string(),
                payee_name: "Cloud Kitchen".to_string(),
            },
            google_client_id: String::new(),
            sentry_dsn: None,
        }
    }

    #[test]
    fn test_socket_addr() {
        let config = test_config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }
}
