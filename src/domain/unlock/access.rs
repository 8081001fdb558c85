//! Per-item access state machine.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::{ContentItem, ContentKind};
use crate::domain::entitlement::EntitlementSnapshot;
use crate::domain::foundation::StateMachine;

/// Visible state of a content item.
///
/// Only moves toward `Unlocked` during a page view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemAccess {
    LockedPreview,
    Unlocked,
}

/// Why an item is unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockReason {
    FreeContent,
    Membership,
    Purchased,
}

impl ItemAccess {
    /// The gate: the reason `item` is unlocked under `snapshot`, if any.
    ///
    /// Membership unlocks membership-tier items only; a purchase unlocks
    /// exactly the purchased paid item. Neither crosses over.
    pub fn unlock_reason(item: &ContentItem, snapshot: &EntitlementSnapshot) -> Option<UnlockReason> {
        match item.kind {
            ContentKind::Free => Some(UnlockReason::FreeContent),
            ContentKind::Membership if snapshot.has_membership => Some(UnlockReason::Membership),
            ContentKind::Paid if snapshot.owns(&item.id) => Some(UnlockReason::Purchased),
            ContentKind::Membership | ContentKind::Paid => None,
        }
    }

    /// The access an item would have under `snapshot` alone.
    pub fn for_item(item: &ContentItem, snapshot: &EntitlementSnapshot) -> Self {
        if Self::unlock_reason(item, snapshot).is_some() {
            ItemAccess::Unlocked
        } else {
            ItemAccess::LockedPreview
        }
    }

    pub fn is_unlocked(&self) -> bool {
        matches!(self, ItemAccess::Unlocked)
    }
}

impl StateMachine for ItemAccess {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ItemAccess::*;
        matches!(
            (self, target),
            (LockedPreview, LockedPreview) | (LockedPreview, Unlocked) | (Unlocked, Unlocked)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ItemAccess::*;
        match self {
            LockedPreview => vec![Unlocked],
            Unlocked => vec![],
        }
    }
}
