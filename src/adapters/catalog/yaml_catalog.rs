//! YAML catalog loader.
//!
//! ```yaml
//! profiles:
//!   - id: profile1
//!     display_name: Creator One
//!     membership_price: 999
//!     promotion_percentage: 17
//!     items:
//!       - id: video3
//!         title: Premium Content 3
//!         kind: paid
//!         base_price: 699
//!         media: { preview: v3-blur.jpg, full: v3.mp4 }
//! ```

use std::path::Path;

use thiserror::Error;
use tokio::fs;

use crate::domain::catalog::Catalog;
use crate::domain::foundation::ValidationError;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(String),

    #[error("Failed to parse catalog: {0}")]
    Parse(String),

    #[error("Invalid catalog: {0}")]
    Invalid(#[from] ValidationError),
}

/// Parses and validates a catalog document.
pub fn parse_catalog(yaml: &str) -> Result<Catalog, CatalogError> {
    let catalog: Catalog = serde_yaml::from_str(yaml).map_err(|e| CatalogError::Parse(e.to_string()))?;
    catalog.validate()?;
    Ok(catalog)
}

/// Reads a catalog file from disk.
pub async fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog, CatalogError> {
    let path = path.as_ref();
    let yaml = fs::read_to_string(path)
        .await
        .map_err(|e| CatalogError::Io(format!("{}: {}", path.display(), e)))?;
    let catalog = parse_catalog(&yaml)?;
    tracing::info!(
        path = %path.display(),
        profiles = catalog.profiles.len(),
        "Catalog loaded"
    );
    Ok(catalog)
}
