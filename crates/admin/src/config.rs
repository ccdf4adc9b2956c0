//! Admin console configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TIFFINBOX_BACKEND_URL` - Base URL of the remote ordering backend
//!
//! ## Optional
//! - `TIFFINBOX_ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `TIFFINBOX_ADMIN_PORT` - Listen port (default: 3001)
//! - `TIFFINBOX_ADMIN_BASE_URL` - Public URL (default: http://localhost:3001)
//! - `TIFFINBOX_BACKEND_TIMEOUT_SECS` - Backend request timeout (default: 15)
//! - `GOOGLE_CLIENT_ID` - Google Identity Services client id
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

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the console
    pub base_url: String,
    /// Backend base URL
    pub backend_url: Url,
    /// Backend request timeout
    pub backend_timeout: Duration,
    /// Google Identity Services client id for the sign-in button
    pub google_client_id: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("TIFFINBOX_ADMIN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("TIFFINBOX_ADMIN_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("TIFFINBOX_ADMIN_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("TIFFINBOX_ADMIN_PORT".to_string(), e.to_string())
            })?;

        let backend_raw = std::env::var("TIFFINBOX_BACKEND_URL")
            .map_err(|_| ConfigError::MissingEnvVar("TIFFINBOX_BACKEND_URL".to_string()))?;
        let backend_url = Url::parse(&backend_raw).map_err(|e| {
            ConfigError::InvalidEnvVar("TIFFINBOX_BACKEND_URL".to_string(), e.to_string())
        })?;

        let timeout_secs = get_env_or_default("TIFFINBOX_BACKEND_TIMEOUT_SECS", "15")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar(
                    "TIFFINBOX_BACKEND_TIMEOUT_SECS".to_string(),
                    e.to_string(),
                )
            })?;

        Ok(Self {
            host,
            port,
            base_url: get_env_or_default("TIFFINBOX_ADMIN_BASE_URL", "http://localhost:3001"),
            backend_url,
            backend_timeout: Duration::from_secs(timeout_secs),
            google_client_id: get_env_or_default("GOOGLE_CLIENT_ID", ""),
            sentry_dsn: std::env::var("SENTRY_DSN").ok(),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
