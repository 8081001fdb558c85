//! Unlock engine.
//!
//! - `access` - per-item gate and the locked/unlocked state machine
//! - `state` - immutable `PageEntitlementState` with monotonic `advance`
//! - `render` - pure render into a `PageView`

mod access;
mod render;
mod state;

pub use access::{ItemAccess, UnlockReason};
pub use render::{
    render, CtaStatusKind, CtaStatusLine, CtaView, ItemView, PageView, PriceBadge,
    PromotionBanner, TokenBarView,
};
pub use state::{ItemGate, PageEntitlementState};
