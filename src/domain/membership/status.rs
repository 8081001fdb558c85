//! Membership subscription status as reported by the backend of record.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Membership subscription status.
///
/// The backend passes through the payment processor's subscription status;
/// anything other than the three statuses the storefront acts on collapses
/// into `Other` (e.g. `past_due`, `incomplete`, `unpaid`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    /// Paid and current.
    Active,

    /// Inside a trial period.
    Trialing,

    /// Subscription ended.
    Canceled,

    /// Any other processor status. Never grants access.
    #[serde(other)]
    Other,
}

impl MembershipStatus {
    /// Returns true if this status grants access to membership-tier content.
    ///
    /// Access is granted for `Active` and `Trialing` only.
    pub fn grants_access(&self) -> bool {
        matches!(self, MembershipStatus::Active | MembershipStatus::Trialing)
    }
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MembershipStatus::Active => "active",
            MembershipStatus::Trialing => "trialing",
            MembershipStatus::Canceled => "canceled",
            MembershipStatus::Other => "other",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_active_and_trialing_grant_access() {
        assert!(MembershipStatus::Active.grants_access());
        assert!(MembershipStatus::Trialing.grants_access());
        assert!(!MembershipStatus::Canceled.grants_access());
        assert!(!MembershipStatus::Other.grants_access());
    }

    #[test]
    fn deserializes_known_statuses() {
        let s: MembershipStatus = serde_json::from_str("\"trialing\"").unwrap();
        assert_eq!(s, MembershipStatus::Trialing);
        let s: MembershipStatus = serde_json::from_str("\"canceled\"").unwrap();
        assert_eq!(s, MembershipStatus::Canceled);
    }

    #[test]
    fn unknown_processor_statuses_become_other() {
        for raw in ["\"past_due\"", "\"incomplete\"", "\"unpaid\""] {
            let s: MembershipStatus = serde_json::from_str(raw).unwrap();
            assert_eq!(s, MembershipStatus::Other, "{}", raw);
        }
    }
}
