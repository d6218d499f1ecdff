//! Checkout client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `COMMERCE_API_URL` - Base URL of the commerce API (e.g., <https://shop.example.com/api>)
//!
//! ## Optional
//! - `COMMERCE_API_KEY` - Server-to-server API key sent as a bearer token
//! - `COMMERCE_API_TIMEOUT_SECS` - Request timeout in seconds (default: 15)
//! - `SUGARLOAF_SESSION_FILE` - Path of the persisted session file
//!   (default: .sugarloaf-session.json)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
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

/// Checkout client configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct CheckoutConfig {
    /// Base URL of the commerce API.
    pub api_url: Url,
    /// Optional server-to-server API key (guest sessions don't need one).
    pub api_key: Option<SecretString>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Where to persist `{order_id, guest_token}` across restarts.
    pub session_file: PathBuf,
}

impl std::fmt::Debug for CheckoutConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutConfig")
            .field("api_url", &self.api_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("session_file", &self.session_file)
            .finish()
    }
}

impl CheckoutConfig {
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

        let api_url = get_required_env("COMMERCE_API_URL")?
            .parse::<Url>()
            .map_err(|e| ConfigError::InvalidEnvVar("COMMERCE_API_URL".to_string(), e.to_string()))?;
        let api_key = get_optional_env("COMMERCE_API_KEY").map(SecretString::from);
        let timeout_secs = get_env_or_default("COMMERCE_API_TIMEOUT_SECS", "15")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("COMMERCE_API_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
        let session_file = PathBuf::from(get_env_or_default(
            "SUGARLOAF_SESSION_FILE",
            ".sugarloaf-session.json",
        ));

        Ok(Self {
            api_url,
            api_key,
            timeout: Duration::from_secs(timeout_secs),
            session_file,
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

    #[test]
    fn test_config_debug_redacts_api_key() {
        let config = CheckoutConfig {
            api_url: "https://shop.example.com/api".parse().unwrap(),
            api_key: Some(SecretString::from("super_secret_key")),
            timeout: Duration::from_secs(15),
            session_file: PathBuf::from(".sugarloaf-session.json"),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("shop.example.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_key"));
    }

    #[test]
    fn test_get_env_or_default_falls_back() {
        assert_eq!(
            get_env_or_default("SUGARLOAF_TEST_UNSET_VAR", "fallback"),
            "fallback"
        );
    }
}
