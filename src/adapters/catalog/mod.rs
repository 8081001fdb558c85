//! Catalog loading.

mod yaml_catalog;

pub use yaml_catalog::{load_catalog, parse_catalog, CatalogError};
