//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `FANPASS` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use fanpass::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Storefront backend at {}", config.api.base_url);
//! ```

mod api;
mod catalog;
mod entitlements;
mod environment;
mod error;
mod logging;

pub use api::ApiConfig;
pub use catalog::CatalogConfig;
pub use entitlements::EntitlementsConfig;
pub use environment::Environment;
pub use error::{ConfigError, ValidationError};
pub use logging::{init_tracing, LoggingConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Deployment environment
    #[serde(default)]
    pub environment: Environment,

    /// Storefront backend and public app URLs
    pub api: ApiConfig,

    /// Entitlement source selection and token award
    #[serde(default)]
    pub entitlements: EntitlementsConfig,

    /// Log filter and format
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Catalog file location
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `FANPASS` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `FANPASS__API__BASE_URL=...` -> `api.base_url = ...`
    /// - `FANPASS__ENTITLEMENTS__SIMULATE=membership` -> `entitlements.simulate = membership`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("FANPASS")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// - URL formats (http/https only)
    /// - HTTPS backend in production
    /// - Request timeout bounds
    /// - No entitlement simulation in production
    /// - Parsable log filter
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.api.validate(&self.environment)?;
        self.entitlements.validate(&self.environment)?;
        self.logging.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.environment.is_production()
    }
}
