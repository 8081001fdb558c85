//! Storefront backend configuration

use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

use super::environment::Environment;
use super::error::ValidationError;

/// Where the storefront backend and the public app live.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Storefront backend base URL (e.g. `https://api.fans.example/v1/`)
    pub base_url: String,

    /// Public app URL; the login page is resolved against it
    pub app_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Key for internal endpoints (token award)
    #[serde(default)]
    pub internal_api_key: Option<SecretString>,

    /// Checkout language sent with session requests
    #[serde(default = "default_language")]
    pub language: String,
}

impl ApiConfig {
    pub fn base_url(&self) -> Result<Url, ValidationError> {
        parse_http_url(&self.base_url).ok_or_else(|| ValidationError::InvalidBaseUrl(self.base_url.clone()))
    }

    pub fn app_url(&self) -> Result<Url, ValidationError> {
        parse_http_url(&self.app_url).ok_or_else(|| ValidationError::InvalidAppUrl(self.app_url.clone()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate API configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let base_url = self.base_url()?;
        self.app_url()?;

        if environment.is_production() && base_url.scheme() != "https" {
            return Err(ValidationError::BaseUrlMustBeHttps);
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

fn parse_http_url(value: &str) -> Option<Url> {
    Url::parse(value)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

fn default_request_timeout() -> u64 {
    10
}

fn default_language() -> String {
    "en".to_string()
}
