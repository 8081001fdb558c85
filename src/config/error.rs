//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Logging initialisation failed: {0}")]
    Logging(String),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid storefront API base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Invalid public app URL: {0}")]
    InvalidAppUrl(String),

    #[error("Storefront API base URL must use HTTPS in production")]
    BaseUrlMustBeHttps,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Entitlement simulation is not allowed in production")]
    SimulationInProduction,

    #[error("Invalid log filter: {0}")]
    InvalidLogFilter(String),
}
