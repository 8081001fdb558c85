//! Immutable per-page entitlement state.
//!
//! One value per page view; every refresh produces a new value through
//! [`PageEntitlementState::advance`]. Rendering reads it and never mutates it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::catalog::Profile;
use crate::domain::entitlement::{EntitlementSnapshot, ResolutionStatus, ResolvedEntitlements};
use crate::domain::foundation::{ProfileId, StateMachine, Timestamp, VideoId};
use crate::domain::membership::{CtaState, Membership};
use crate::domain::promotion::{PromotionOffer, PromotionWindow};

use super::{ItemAccess, UnlockReason};

/// Gate outcome for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemGate {
    pub access: ItemAccess,
    pub reason: Option<UnlockReason>,
}

impl ItemGate {
    pub const LOCKED: Self = Self {
        access: ItemAccess::LockedPreview,
        reason: None,
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageEntitlementState {
    profile_id: ProfileId,
    resolved: ResolvedEntitlements,
    gates: BTreeMap<VideoId, ItemGate>,
    promotion: PromotionOffer,
    evaluated_at: Timestamp,
    refresh_failed: bool,
}

impl PageEntitlementState {
    /// First state of a page view.
    pub fn initial(profile: &Profile, resolved: ResolvedEntitlements, now: Timestamp) -> Self {
        let gates = profile
            .items
            .iter()
            .map(|item| {
                let reason = ItemAccess::unlock_reason(item, &resolved.snapshot);
                let access = ItemAccess::for_item(item, &resolved.snapshot);
                (item.id.clone(), ItemGate { access, reason })
            })
            .collect();

        Self {
            profile_id: profile.id.clone(),
            promotion: promotion_for(profile, &resolved.snapshot, &now),
            resolved,
            gates,
            evaluated_at: now,
            refresh_failed: false,
        }
    }

    /// Applies a fresh resolution.
    ///
    /// A non-authoritative resolution leaves the prior snapshot in place
    /// entirely. Otherwise the new snapshot replaces the old one, and items
    /// only move toward unlocked.
    pub fn advance(&self, profile: &Profile, resolved: ResolvedEntitlements, now: Timestamp) -> Self {
        if !resolved.is_authoritative() {
            let mut kept = self.at(now);
            kept.refresh_failed = true;
            return kept;
        }

        let mut next = Self::initial(profile, resolved, now);
        for (id, gate) in next.gates.iter_mut() {
            let previous = self.gates.get(id).copied().unwrap_or(ItemGate::LOCKED);
            if previous.access.transition_to(gate.access).is_err() {
                *gate = previous;
            }
        }
        next
    }

    /// Same entitlements re-evaluated at `now` (promotion countdown tick).
    pub fn at(&self, now: Timestamp) -> Self {
        let mut next = self.clone();
        next.promotion = PromotionOffer::new(
            PromotionWindow::evaluate(member_record(&self.resolved.snapshot), &now),
            self.promotion.percentage,
        );
        next.evaluated_at = now;
        next
    }

    pub fn profile_id(&self) -> &ProfileId {
        &self.profile_id
    }

    pub fn snapshot(&self) -> &EntitlementSnapshot {
        &self.resolved.snapshot
    }

    pub fn resolved(&self) -> &ResolvedEntitlements {
        &self.resolved
    }

    pub fn status(&self) -> ResolutionStatus {
        self.resolved.status
    }

    pub fn gate(&self, id: &VideoId) -> ItemGate {
        self.gates.get(id).copied().unwrap_or(ItemGate::LOCKED)
    }

    pub fn access(&self, id: &VideoId) -> ItemAccess {
        self.gate(id).access
    }

    pub fn promotion(&self) -> &PromotionOffer {
        &self.promotion
    }

    pub fn cta(&self) -> CtaState {
        CtaState::from_membership(self.resolved.snapshot.membership.as_ref())
    }

    pub fn evaluated_at(&self) -> Timestamp {
        self.evaluated_at
    }

    /// True when the last refresh could not reach the backend.
    pub fn refresh_failed(&self) -> bool {
        self.refresh_failed
    }

    /// Non-blocking hint that access could not be checked.
    pub fn has_soft_error(&self) -> bool {
        self.refresh_failed || self.resolved.has_soft_error()
    }
}

/// The membership whose promotion counts: only one granting access.
fn member_record(snapshot: &EntitlementSnapshot) -> Option<&Membership> {
    snapshot.membership.as_ref().filter(|m| m.grants_access())
}

fn promotion_for(profile: &Profile, snapshot: &EntitlementSnapshot, now: &Timestamp) -> PromotionOffer {
    PromotionOffer::new(
        PromotionWindow::evaluate(member_record(snapshot), now),
        profile.promotion_discount(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{ContentItem, ContentKind, MediaRefs};
    use crate::domain::foundation::{Cents, Percentage};
    use crate::domain::membership::record::test_support::active_membership;

    fn vid(s: &str) -> VideoId {
        VideoId::new(s).unwrap()
    }

    fn profile() -> Profile {
        let item = |id: &str, kind| ContentItem {
            id: vid(id),
            title: id.to_string(),
            kind,
            base_price: Cents::new(699),
            media: MediaRefs {
                preview: format!("/previews/{}", id),
                full: format!("/videos/{}", id),
            },
        };
        Profile {
            id: ProfileId::new("profile1").unwrap(),
            display_name: "Creator One".to_string(),
            membership_price: Some(Cents::new(999)),
            promotion_percentage: Some(Percentage::new(20)),
            items: vec![
                item("free1", ContentKind::Free),
                item("member1", ContentKind::Membership),
                item("video3", ContentKind::Paid),
            ],
        }
    }

    fn now() -> Timestamp {
        Timestamp::parse_rfc3339("2026-01-01T12:00:00Z").unwrap()
    }

    fn verified(snapshot: EntitlementSnapshot) -> ResolvedEntitlements {
        ResolvedEntitlements {
            snapshot,
            status: ResolutionStatus::Verified,
            user: None,
        }
    }

    fn owning(ids: &[&str]) -> EntitlementSnapshot {
        EntitlementSnapshot {
            purchased_video_ids: ids.iter().map(|id| vid(id)).collect(),
            ..EntitlementSnapshot::locked()
        }
    }

    #[test]
    fn anonymous_page_unlocks_only_free_items() {
        let state = PageEntitlementState::initial(&profile(), ResolvedEntitlements::anonymous(), now());
        assert!(state.access(&vid("free1")).is_unlocked());
        assert!(!state.access(&vid("member1")).is_unlocked());
        assert!(!state.access(&vid("video3")).is_unlocked());
        assert_eq!(state.cta(), CtaState::Subscribe);
    }

    #[test]
    fn advance_applies_a_new_purchase() {
        let p = profile();
        let before = PageEntitlementState::initial(&p, verified(EntitlementSnapshot::locked()), now());
        let after = before.advance(&p, verified(owning(&["video3"])), now());
        assert!(after.access(&vid("video3")).is_unlocked());
        assert_eq!(after.gate(&vid("video3")).reason, Some(UnlockReason::Purchased));
    }

    #[test]
    fn advance_never_relocks_an_item_within_a_page_view() {
        let p = profile();
        let before = PageEntitlementState::initial(&p, verified(owning(&["video3"])), now());
        let after = before.advance(&p, verified(EntitlementSnapshot::locked()), now());
        assert!(after.access(&vid("video3")).is_unlocked());
    }

    #[test]
    fn failed_refresh_keeps_prior_snapshot_entirely() {
        let p = profile();
        let before = PageEntitlementState::initial(&p, verified(owning(&["video3"])), now());
        let after = before.advance(&p, ResolvedEntitlements::unavailable(), now().plus_secs(5));
        assert_eq!(after.snapshot(), before.snapshot());
        assert_eq!(after.status(), ResolutionStatus::Verified);
        assert!(after.refresh_failed());
        assert!(after.has_soft_error());
    }

    #[test]
    fn promotion_requires_an_access_granting_membership() {
        let p = profile();
        let mut m = active_membership("profile1");
        m.promotion_expires_at = Some(now().plus_secs(90));
        let member = EntitlementSnapshot {
            has_membership: true,
            membership: Some(m.clone()),
            ..EntitlementSnapshot::locked()
        };
        let state = PageEntitlementState::initial(&p, verified(member), now());
        assert!(state.promotion().applies());
        assert_eq!(state.promotion().window.remaining_seconds, 90);

        m.status = crate::domain::membership::MembershipStatus::Canceled;
        let lapsed = EntitlementSnapshot {
            has_membership: false,
            membership: Some(m),
            ..EntitlementSnapshot::locked()
        };
        let state = PageEntitlementState::initial(&p, verified(lapsed), now());
        assert!(!state.promotion().applies());
    }

    #[test]
    fn at_recomputes_the_promotion_only() {
        let p = profile();
        let mut m = active_membership("profile1");
        m.promotion_expires_at = Some(now().plus_secs(2));
        let member = EntitlementSnapshot {
            has_membership: true,
            membership: Some(m),
            ..EntitlementSnapshot::locked()
        };
        let state = PageEntitlementState::initial(&p, verified(member), now());
        let later = state.at(now().plus_secs(2));
        assert!(!later.promotion().applies());
        assert_eq!(later.snapshot(), state.snapshot());
    }
}
