//! Entitlement domain module.
//!
//! Purchases, loyalty tokens, and the per-profile snapshot the page renders from.

mod purchase;
mod snapshot;

pub use purchase::{
    PurchaseTokens, PurchasedContent, TokenBenefit, DEFAULT_DAYS_UNTIL_NEXT_TOKEN,
    FREE_UNLOCK_TOKEN_COST,
};
pub use snapshot::{
    AccountUser, EntitlementSnapshot, ResolutionStatus, ResolvedEntitlements, VerifiedAccount,
};
