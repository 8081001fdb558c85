//! Catalog location

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
    /// YAML catalog file
    #[serde(default)]
    pub path: Option<PathBuf>,
}
