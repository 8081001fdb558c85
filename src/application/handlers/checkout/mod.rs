//! Checkout handlers.
//!
//! ## Commands
//! - Buying a single item, by tokens or external checkout
//! - Pressing the membership button (follow, subscribe, manage)
//! - Handling the return from the external payment surface

mod checkout_return;
mod membership_cta;
mod purchase_content;

pub use checkout_return::{
    CheckoutReturnHandler, CheckoutReturnOutcome, HandleCheckoutReturnCommand, ProcessedSessions,
};
pub use membership_cta::{MembershipCtaCommand, MembershipCtaHandler, MembershipCtaOutcome};
pub use purchase_content::{PurchaseContentCommand, PurchaseContentHandler, PurchaseOutcome};
