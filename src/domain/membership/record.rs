//! Membership record mirrored from the backend for one page view.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ProfileId, Timestamp};

use super::MembershipStatus;

/// A viewer's subscription to one profile.
///
/// Read-only: the page never persists or mutates these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub profile_id: ProfileId,
    pub status: MembershipStatus,
    pub cancel_at_period_end: bool,
    pub current_period_end: Option<Timestamp>,
    /// End of the time-boxed pay-per-item discount, when one was granted.
    pub promotion_expires_at: Option<Timestamp>,
}

impl Membership {
    /// Returns true if this membership unlocks membership-tier content.
    pub fn grants_access(&self) -> bool {
        self.status.grants_access()
    }

    /// True when the subscription will not renew at period end.
    pub fn renewal_disabled(&self) -> bool {
        self.cancel_at_period_end
    }

    pub fn belongs_to(&self, profile_id: &ProfileId) -> bool {
        &self.profile_id == profile_id
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn active_membership(profile: &str) -> Membership {
        Membership {
            profile_id: ProfileId::new(profile).unwrap(),
            status: MembershipStatus::Active,
            cancel_at_period_end: false,
            current_period_end: None,
            promotion_expires_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::active_membership;
    use super::*;

    #[test]
    fn canceled_membership_does_not_grant_access() {
        let mut m = active_membership("profile1");
        m.status = MembershipStatus::Canceled;
        assert!(!m.grants_access());
    }

    #[test]
    fn belongs_to_matches_exact_profile() {
        let m = active_membership("profile1");
        assert!(m.belongs_to(&ProfileId::new("profile1").unwrap()));
        assert!(!m.belongs_to(&ProfileId::new("profile10").unwrap()));
    }
}
