//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod checkout;
pub(crate) mod credential;
pub mod page;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use checkout::{
    CheckoutReturnHandler, CheckoutReturnOutcome, HandleCheckoutReturnCommand, MembershipCtaCommand,
    MembershipCtaHandler, MembershipCtaOutcome, ProcessedSessions, PurchaseContentCommand,
    PurchaseContentHandler, PurchaseOutcome,
};
pub use page::{LoadProfilePageHandler, LoadProfilePageQuery, LoadProfilePageResult, PageError};
pub use session::{
    DeleteAccountCommand, DeleteAccountError, DeleteAccountHandler, DeleteAccountResult, LogoutHandler,
    LogoutResult,
};
