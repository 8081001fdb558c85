//! Errors surfaced by user-initiated checkout actions.

use thiserror::Error;

use crate::domain::checkout::CheckoutKind;
use crate::domain::foundation::VideoId;
use crate::domain::pricing::PricingError;
use crate::ports::{CredentialStoreError, ServiceError, TokenUnlockRejection, UserAlert};

/// Which button the viewer pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckoutAction {
    ContentCheckout,
    MembershipCheckout,
    ManageSubscription,
    TokenUnlock,
    Follow,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// The action needs a signed-in viewer and no redirect applies.
    #[error("Sign-in required")]
    LoginRequired,

    /// The same action is already running.
    #[error("A request for '{0}' is already in progress")]
    InFlight(String),

    #[error("Item '{0}' is not on this profile")]
    UnknownItem(VideoId),

    #[error(transparent)]
    InvalidTokenUnlock(#[from] TokenUnlockRejection),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Creating the checkout, portal, unlock, or follow request failed.
    #[error("{action:?} failed: {source}")]
    Initiation {
        action: CheckoutAction,
        source: ServiceError,
    },

    /// The payment surface reported success but the backend did not confirm it.
    #[error("Payment could not be confirmed: {source}")]
    PostPaymentVerification {
        kind: CheckoutKind,
        source: ServiceError,
    },

    /// Payment reported success without a session to verify.
    #[error("Payment return carried no session id")]
    MissingSession { kind: CheckoutKind },

    #[error(transparent)]
    CredentialStore(#[from] CredentialStoreError),
}

impl CheckoutError {
    pub fn initiation(action: CheckoutAction, source: ServiceError) -> Self {
        CheckoutError::Initiation { action, source }
    }

    /// Text shown to the viewer.
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::LoginRequired => "Please sign in to continue.".to_string(),
            CheckoutError::InFlight(_) => "Please wait, your request is still being processed.".to_string(),
            CheckoutError::UnknownItem(_) | CheckoutError::Pricing(_) => {
                "This content is not available for purchase.".to_string()
            }
            CheckoutError::InvalidTokenUnlock(rejection) => {
                format!("Failed to unlock content with tokens.\n\nError: {}", rejection)
            }
            CheckoutError::Initiation { action, source } => match action {
                CheckoutAction::ContentCheckout | CheckoutAction::MembershipCheckout => {
                    "Failed to start checkout. Please try again.".to_string()
                }
                CheckoutAction::ManageSubscription => {
                    "Failed to open subscription management. Please try again.".to_string()
                }
                CheckoutAction::TokenUnlock => {
                    format!("Failed to unlock content with tokens.\n\nError: {}", source.message)
                }
                CheckoutAction::Follow => "Failed to follow creator. Please try again.".to_string(),
            },
            CheckoutError::PostPaymentVerification { kind, source } => {
                post_payment_message(*kind, &source.message)
            }
            CheckoutError::MissingSession { kind } => post_payment_message(*kind, "missing checkout session"),
            CheckoutError::CredentialStore(_) => {
                "Your session could not be saved. Please sign in again.".to_string()
            }
        }
    }

    /// Alert to show, or `None` for errors that stay silent.
    pub fn alert(&self) -> Option<UserAlert> {
        match self {
            CheckoutError::InFlight(_) | CheckoutError::LoginRequired => None,
            CheckoutError::PostPaymentVerification { .. } | CheckoutError::MissingSession { .. } => {
                Some(UserAlert::critical(self.user_message()))
            }
            _ => Some(UserAlert::error(self.user_message())),
        }
    }

    /// True when money may have moved.
    pub fn is_post_payment(&self) -> bool {
        matches!(
            self,
            CheckoutError::PostPaymentVerification { .. } | CheckoutError::MissingSession { .. }
        )
    }
}

fn post_payment_message(kind: CheckoutKind, detail: &str) -> String {
    let what = match kind {
        CheckoutKind::Membership => "activate membership",
        CheckoutKind::ContentPurchase => "unlock content",
    };
    format!(
        "Payment successful, but failed to {}.\n\nError: {}\n\nPlease refresh the page in a few moments or contact support.",
        what, detail
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::AlertSeverity;

    #[test]
    fn checkout_initiation_message_is_generic() {
        let err = CheckoutError::initiation(CheckoutAction::ContentCheckout, ServiceError::network("reset"));
        assert_eq!(err.user_message(), "Failed to start checkout. Please try again.");
        assert_eq!(err.alert().unwrap().severity, AlertSeverity::Error);
    }

    #[test]
    fn portal_failure_names_subscription_management() {
        let err = CheckoutError::initiation(CheckoutAction::ManageSubscription, ServiceError::server("500"));
        assert_eq!(
            err.user_message(),
            "Failed to open subscription management. Please try again."
        );
    }

    #[test]
    fn post_payment_failure_is_critical_and_mentions_support() {
        let err = CheckoutError::PostPaymentVerification {
            kind: CheckoutKind::ContentPurchase,
            source: ServiceError::timeout("verify-session timed out"),
        };
        let alert = err.alert().unwrap();
        assert_eq!(alert.severity, AlertSeverity::Critical);
        assert!(alert.message.starts_with("Payment successful, but failed to unlock content."));
        assert!(alert.message.contains("contact support"));
        assert!(err.is_post_payment());
    }

    #[test]
    fn in_flight_is_silent() {
        assert!(CheckoutError::InFlight("video3".into()).alert().is_none());
    }
}
