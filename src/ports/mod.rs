//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storefront Backend Ports
//!
//! - `VerificationService` - Token and checkout-session verification
//! - `CheckoutService` - Checkout sessions, token unlocks, free memberships
//! - `EntitlementSource` - Resolution strategy selected at startup
//!
//! ## Page Host Ports
//!
//! - `CredentialStore` - Where the session keeps its credential
//! - `Navigator` - Tabs and location
//! - `UserPrompt` - Confirmations and alerts
//! - `Clock` - Current time

mod checkout_service;
mod clock;
mod credential_store;
mod entitlement_source;
mod navigator;
mod service_error;
mod user_prompt;
mod verification_service;

pub use checkout_service::{
    CheckoutRedirect, CheckoutService, ContentCheckoutRequest, FreeMembershipRequest,
    MembershipCheckoutRequest, TokenUnlockRejection, TokenUnlockRequest,
};
pub use clock::Clock;
pub use credential_store::{CredentialStore, CredentialStoreError};
pub use entitlement_source::EntitlementSource;
pub use navigator::{NavigationError, Navigator};
pub use service_error::{ServiceError, ServiceErrorCode};
pub use user_prompt::{AlertSeverity, UserAlert, UserPrompt};
pub use verification_service::{VerificationService, VerifySessionRequest};
