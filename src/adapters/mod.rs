//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - reqwest client for the storefront backend
//! - `auth` - Access-token claim decoding
//! - `credentials` - Cookie-jar and in-memory credential stores
//! - `entitlement` - Live and fixture entitlement sources
//! - `background` - Detached token award
//! - `catalog` - YAML catalog loading
//! - `clock` - System and fixed clocks
//! - `ui` - Headless navigator and prompt
//! - `storefront` - In-process storefront backend for tests

pub mod auth;
pub mod background;
pub mod catalog;
pub mod clock;
pub mod credentials;
pub mod entitlement;
pub mod http;
pub mod storefront;
pub mod ui;

pub use clock::{FixedClock, SystemClock};
