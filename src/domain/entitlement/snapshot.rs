//! Resolved entitlements for one viewer against one profile.
//!
//! The verification service returns everything a user holds across every
//! profile; `EntitlementSnapshot::for_profile` narrows that to the profile
//! being viewed by exact profile id match.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::foundation::{ProfileId, UserId, VideoId};
use crate::domain::membership::Membership;

use super::{PurchaseTokens, PurchasedContent};

/// Identity echoed back by the verification service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

/// Everything the backend says a user holds, unfiltered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedAccount {
    pub user: Option<AccountUser>,
    pub memberships: Vec<Membership>,
    pub purchased_content: Vec<PurchasedContent>,
    pub purchase_tokens: Vec<PurchaseTokens>,
}

/// The viewer's rights on one profile.
///
/// Ordered collections keep two resolutions of the same backend state equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementSnapshot {
    pub has_membership: bool,
    pub membership: Option<Membership>,
    pub purchased_video_ids: BTreeSet<VideoId>,
    pub tokens: Option<PurchaseTokens>,
}

impl EntitlementSnapshot {
    /// The all-locked state: no membership, no purchases, no tokens.
    pub fn locked() -> Self {
        Self::default()
    }

    /// Narrows a verified account to a single profile.
    ///
    /// When several memberships exist for the profile, one granting access
    /// wins over lapsed ones; otherwise the first listed is kept so the CTA
    /// can still see it.
    pub fn for_profile(account: &VerifiedAccount, profile_id: &ProfileId) -> Self {
        let mut for_profile = account.memberships.iter().filter(|m| m.belongs_to(profile_id));
        let membership = for_profile
            .clone()
            .find(|m| m.grants_access())
            .or_else(|| for_profile.next())
            .cloned();

        let purchased_video_ids = account
            .purchased_content
            .iter()
            .filter(|p| &p.profile_id == profile_id)
            .map(|p| p.video_id.clone())
            .collect();

        let tokens = account
            .purchase_tokens
            .iter()
            .find(|t| &t.profile_id == profile_id)
            .cloned();

        Self {
            has_membership: membership.as_ref().map_or(false, Membership::grants_access),
            membership,
            purchased_video_ids,
            tokens,
        }
    }

    pub fn owns(&self, video_id: &VideoId) -> bool {
        self.purchased_video_ids.contains(video_id)
    }

    pub fn token_count(&self) -> u32 {
        self.tokens.as_ref().map_or(0, |t| t.token_count)
    }

    /// True when nothing at all is held.
    pub fn is_locked(&self) -> bool {
        !self.has_membership && self.purchased_video_ids.is_empty() && self.tokens.is_none()
    }
}

/// How a snapshot was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    /// No usable credential; no network call was made.
    Anonymous,

    /// The backend verified the credential.
    Verified,

    /// The backend rejected the credential.
    Rejected,

    /// The backend could not be reached or errored. Soft error for the UI.
    Unavailable,

    /// Canned state from the fixture source (non-production only).
    Simulated,
}

/// Outcome of one entitlement resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEntitlements {
    pub snapshot: EntitlementSnapshot,
    pub status: ResolutionStatus,
    /// Identity echoed by the backend, when verified.
    pub user: Option<AccountUser>,
}

impl ResolvedEntitlements {
    pub fn anonymous() -> Self {
        Self::locked_with(ResolutionStatus::Anonymous)
    }

    pub fn rejected() -> Self {
        Self::locked_with(ResolutionStatus::Rejected)
    }

    pub fn unavailable() -> Self {
        Self::locked_with(ResolutionStatus::Unavailable)
    }

    pub fn verified(account: &VerifiedAccount, profile_id: &ProfileId) -> Self {
        Self {
            snapshot: EntitlementSnapshot::for_profile(account, profile_id),
            status: ResolutionStatus::Verified,
            user: account.user.clone(),
        }
    }

    pub fn simulated(snapshot: EntitlementSnapshot) -> Self {
        Self {
            snapshot,
            status: ResolutionStatus::Simulated,
            user: None,
        }
    }

    fn locked_with(status: ResolutionStatus) -> Self {
        Self {
            snapshot: EntitlementSnapshot::locked(),
            status,
            user: None,
        }
    }

    /// True when the page may show a non-blocking "couldn't check access" hint.
    pub fn has_soft_error(&self) -> bool {
        self.status == ResolutionStatus::Unavailable
    }

    /// True when the snapshot reflects a definitive answer rather than a
    /// fail-closed fallback.
    pub fn is_authoritative(&self) -> bool {
        !matches!(self.status, ResolutionStatus::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Cents;
    use crate::domain::membership::record::test_support::active_membership;
    use crate::domain::membership::MembershipStatus;

    fn pid(s: &str) -> ProfileId {
        ProfileId::new(s).unwrap()
    }

    fn vid(s: &str) -> VideoId {
        VideoId::new(s).unwrap()
    }

    fn purchase(profile: &str, video: &str) -> PurchasedContent {
        PurchasedContent {
            profile_id: pid(profile),
            video_id: vid(video),
            amount: Cents::new(499),
            created_at: None,
        }
    }

    fn tokens(profile: &str, count: u32) -> PurchaseTokens {
        PurchaseTokens {
            profile_id: pid(profile),
            token_count: count,
            days_remaining: 12,
        }
    }

    #[test]
    fn locked_snapshot_holds_nothing() {
        let s = EntitlementSnapshot::locked();
        assert!(s.is_locked());
        assert_eq!(s.token_count(), 0);
    }

    #[test]
    fn filters_everything_down_to_the_viewed_profile() {
        let account = VerifiedAccount {
            user: None,
            memberships: vec![active_membership("profile2")],
            purchased_content: vec![purchase("profile1", "video1"), purchase("profile2", "video9")],
            purchase_tokens: vec![tokens("profile2", 3), tokens("profile1", 1)],
        };

        let s = EntitlementSnapshot::for_profile(&account, &pid("profile1"));

        assert!(!s.has_membership);
        assert!(s.membership.is_none());
        assert!(s.owns(&vid("video1")));
        assert!(!s.owns(&vid("video9")));
        assert_eq!(s.token_count(), 1);
    }

    #[test]
    fn access_granting_membership_wins_over_lapsed_one() {
        let mut lapsed = active_membership("profile1");
        lapsed.status = MembershipStatus::Canceled;
        let account = VerifiedAccount {
            memberships: vec![lapsed, active_membership("profile1")],
            ..Default::default()
        };

        let s = EntitlementSnapshot::for_profile(&account, &pid("profile1"));

        assert!(s.has_membership);
        assert_eq!(s.membership.unwrap().status, MembershipStatus::Active);
    }

    #[test]
    fn lapsed_membership_is_kept_but_grants_nothing() {
        let mut lapsed = active_membership("profile1");
        lapsed.status = MembershipStatus::Other;
        let account = VerifiedAccount {
            memberships: vec![lapsed],
            ..Default::default()
        };

        let s = EntitlementSnapshot::for_profile(&account, &pid("profile1"));

        assert!(!s.has_membership);
        assert!(s.membership.is_some());
    }

    #[test]
    fn resolving_the_same_account_twice_is_identical() {
        let account = VerifiedAccount {
            user: None,
            memberships: vec![active_membership("profile1")],
            purchased_content: vec![purchase("profile1", "video3"), purchase("profile1", "video1")],
            purchase_tokens: vec![tokens("profile1", 2)],
        };
        let a = ResolvedEntitlements::verified(&account, &pid("profile1"));
        let b = ResolvedEntitlements::verified(&account, &pid("profile1"));
        assert_eq!(a, b);
    }

    #[test]
    fn only_unavailable_is_a_soft_error() {
        assert!(ResolvedEntitlements::unavailable().has_soft_error());
        assert!(!ResolvedEntitlements::rejected().has_soft_error());
        assert!(!ResolvedEntitlements::anonymous().has_soft_error());
        assert!(!ResolvedEntitlements::unavailable().is_authoritative());
    }
}
