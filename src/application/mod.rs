//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Each user action on the profile page is one handler; `ProfilePage`
//! composes them for a single page view.

pub mod countdown;
pub mod error;
pub mod handlers;
pub mod in_flight;
pub mod navigation;
pub mod page_controller;

pub use countdown::{CountdownEvent, PromotionCountdown};
pub use error::{CheckoutAction, CheckoutError};
pub use handlers::{
    CheckoutReturnHandler, CheckoutReturnOutcome, DeleteAccountCommand, DeleteAccountError, DeleteAccountHandler,
    DeleteAccountResult, HandleCheckoutReturnCommand, LoadProfilePageHandler, LoadProfilePageQuery,
    LoadProfilePageResult, LogoutHandler, LogoutResult, MembershipCtaCommand, MembershipCtaHandler,
    MembershipCtaOutcome, PageError, ProcessedSessions, PurchaseContentCommand, PurchaseContentHandler,
    PurchaseOutcome,
};
pub use in_flight::{InFlightGuard, InFlightRegistry};
pub use navigation::{NavigationTarget, PendingNavigation};
pub use page_controller::{PageServices, ProfilePage, ProfilePageError};
