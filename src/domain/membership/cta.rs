//! Membership call-to-action state machine.
//!
//! The CTA is derived from the resolved membership on every render; it is
//! never stored. All three states stay clickable.

use serde::{Deserialize, Serialize};

use super::Membership;

/// Visible state of the membership button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CtaState {
    /// No membership granting access.
    Subscribe,

    /// Access granted and the subscription renews.
    Subscribed,

    /// Access granted but cancellation is scheduled at period end.
    Renew,
}

/// What clicking the button does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CtaIntent {
    /// Zero-price profile: create a free membership directly.
    Follow,

    /// Start an external membership checkout.
    Checkout,

    /// Open the external subscription-management surface.
    ManageSubscription,
}

impl CtaState {
    /// Derives the CTA state from the viewer's membership for this profile.
    pub fn from_membership(membership: Option<&Membership>) -> Self {
        match membership {
            Some(m) if m.grants_access() && m.renewal_disabled() => CtaState::Renew,
            Some(m) if m.grants_access() => CtaState::Subscribed,
            _ => CtaState::Subscribe,
        }
    }

    /// The click behaviour for this state.
    pub fn intent(&self, free_profile: bool) -> CtaIntent {
        match self {
            CtaState::Subscribe if free_profile => CtaIntent::Follow,
            CtaState::Subscribe => CtaIntent::Checkout,
            CtaState::Subscribed | CtaState::Renew => CtaIntent::ManageSubscription,
        }
    }

    /// Label key for the button; zero-price profiles say "follow".
    pub fn label(&self, free_profile: bool) -> &'static str {
        match self {
            CtaState::Subscribe if free_profile => "follow",
            CtaState::Subscribe => "subscribe",
            CtaState::Subscribed => "subscribed",
            CtaState::Renew => "renew",
        }
    }

    pub fn is_member(&self) -> bool {
        !matches!(self, CtaState::Subscribe)
    }
}
