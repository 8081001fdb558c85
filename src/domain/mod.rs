//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, money, percentage, timestamp, errors)
//! - `catalog` - Profiles and content items
//! - `membership` - Membership records and the call-to-action state
//! - `entitlement` - Purchases, tokens, and the per-profile snapshot
//! - `credential` - Viewer credential
//! - `promotion` - Time-boxed discount window
//! - `pricing` - Price resolution with the token/promotion priority order
//! - `unlock` - Item gating, page state, and pure render
//! - `checkout` - Return indicators and login redirect

pub mod catalog;
pub mod checkout;
pub mod credential;
pub mod entitlement;
pub mod foundation;
pub mod membership;
pub mod pricing;
pub mod promotion;
pub mod unlock;
