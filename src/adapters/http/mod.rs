//! HTTP adapter for the storefront backend.

mod storefront_client;
pub mod wire;

pub use storefront_client::{StorefrontClient, StorefrontClientConfig};
