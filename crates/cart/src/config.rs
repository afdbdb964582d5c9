//! Cart client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FASHIONHUB_API_URL` - Base URL of the storefront REST API
//!   (e.g., `https://shop.example.com/api`)
//!
//! ## Optional
//! - `FASHIONHUB_PROFILE_DIR` - Directory for durable client state
//!   (default: `$HOME/.fashionhub`)
//! - `FASHIONHUB_CART_RETENTION_DAYS` - Local cart retention window
//!   (default: 30)
//! - `FASHIONHUB_REQUEST_TIMEOUT_SECS` - Per-request timeout for remote
//!   cart calls (default: 10)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_RETENTION_DAYS: i64 = 30;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const PROFILE_DIR_NAME: &str = ".fashionhub";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart client configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Base URL of the storefront REST API.
    pub api_url: Url,
    /// Directory holding durable client state (local cart, session token).
    pub profile_dir: PathBuf,
    /// How long a locally persisted cart stays valid.
    pub retention: chrono::Duration,
    /// Timeout applied to every remote cart call.
    pub request_timeout: Duration,
}

impl CartConfig {
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

        let api_url = required("FASHIONHUB_API_URL")?;
        let api_url = Url::parse(&api_url)
            .map_err(|e| ConfigError::InvalidEnvVar("FASHIONHUB_API_URL".into(), e.to_string()))?;

        let profile_dir = std::env::var_os("FASHIONHUB_PROFILE_DIR")
            .map_or_else(default_profile_dir, PathBuf::from);

        let retention_days = optional_parse::<i64>("FASHIONHUB_CART_RETENTION_DAYS")?
            .unwrap_or(DEFAULT_RETENTION_DAYS);
        if retention_days <= 0 {
            return Err(ConfigError::InvalidEnvVar(
                "FASHIONHUB_CART_RETENTION_DAYS".into(),
                "must be positive".into(),
            ));
        }

        let timeout_secs = optional_parse::<u64>("FASHIONHUB_REQUEST_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        Ok(Self {
            api_url,
            profile_dir,
            retention: chrono::Duration::days(retention_days),
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Path of the serialized local cart record.
    #[must_use]
    pub fn cart_file(&self) -> PathBuf {
        self.profile_dir.join("cart.json")
    }
}

fn default_profile_dir() -> PathBuf {
    std::env::var_os("HOME").map_or_else(
        || PathBuf::from(PROFILE_DIR_NAME),
        |home| PathBuf::from(home).join(PROFILE_DIR_NAME),
    )
}

fn required(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidEnvVar(name.to_string(), e.to_string())),
        Err(_) => Ok(None),
    }
}

// Env mutation needs unsafe blocks on edition 2024.
#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;

    // Env mutation is process-global, so all cases run in a single test.
    #[test]
    fn test_from_env() {
        unsafe {
            std::env::remove_var("FASHIONHUB_API_URL");
            std::env::remove_var("FASHIONHUB_CART_RETENTION_DAYS");
            std::env::remove_var("FASHIONHUB_REQUEST_TIMEOUT_SECS");
            std::env::set_var("FASHIONHUB_PROFILE_DIR", "/tmp/fh-test-profile");
        }

        assert!(matches!(
            CartConfig::from_env(),
            Err(ConfigError::MissingEnvVar(_))
        ));

        unsafe {
            std::env::set_var("FASHIONHUB_API_URL", "not a url");
        }
        assert!(matches!(
            CartConfig::from_env(),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));

        unsafe {
            std::env::set_var("FASHIONHUB_API_URL", "http://localhost:5000/api");
        }
        let config = CartConfig::from_env().expect("valid config");
        assert_eq!(config.api_url.as_str(), "http://localhost:5000/api");
        assert_eq!(config.retention, chrono::Duration::days(30));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(
            config.cart_file(),
            PathBuf::from("/tmp/fh-test-profile/cart.json")
        );

        unsafe {
            std::env::set_var("FASHIONHUB_CART_RETENTION_DAYS", "0");
        }
        assert!(matches!(
            CartConfig::from_env(),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        unsafe {
            std::env::remove_var("FASHIONHUB_CART_RETENTION_DAYS");
        }
    }
}
