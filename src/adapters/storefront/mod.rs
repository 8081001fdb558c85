//! In-process storefront backend.

mod mock_storefront;

pub use mock_storefront::{MethodCall, MockStorefront};
