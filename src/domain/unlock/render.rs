//! Pure render of a profile page from its entitlement state.
//!
//! `render` is a function of `(Profile, PageEntitlementState)` only; the
//! presentation layer consumes `PageView` and owns no flags of its own.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::{ContentKind, Profile};
use crate::domain::entitlement::{ResolutionStatus, TokenBenefit, DEFAULT_DAYS_UNTIL_NEXT_TOKEN};
use crate::domain::foundation::{Cents, Percentage, ProfileId, VideoId};
use crate::domain::membership::{CtaIntent, CtaState};
use crate::domain::pricing;

use super::{ItemAccess, PageEntitlementState, UnlockReason};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageView {
    pub profile_id: ProfileId,
    pub display_name: String,
    pub items: Vec<ItemView>,
    pub cta: CtaView,
    pub token_bar: Option<TokenBarView>,
    pub promotion: Option<PromotionBanner>,
    pub status: ResolutionStatus,
    /// Show a non-blocking "couldn't check your access" hint.
    pub soft_error: bool,
}

impl PageView {
    pub fn item(&self, id: &VideoId) -> Option<&ItemView> {
        self.items.iter().find(|i| &i.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemView {
    pub id: VideoId,
    pub title: String,
    pub kind: ContentKind,
    pub access: ItemAccess,
    /// Preview asset while locked, full asset once unlocked.
    pub media_ref: String,
    pub show_lock: bool,
    pub price_badge: Option<PriceBadge>,
    pub owned: bool,
    pub unlock_reason: Option<UnlockReason>,
    /// Clicking the item starts a purchase.
    pub purchasable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBadge {
    pub amount: Cents,
    /// Struck-through base price, only while a promotion applies.
    pub original: Option<Cents>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CtaStatusKind {
    RenewsOn,
    EndsOn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CtaStatusLine {
    pub kind: CtaStatusKind,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CtaView {
    pub state: CtaState,
    pub label: String,
    pub intent: CtaIntent,
    pub membership_price: Option<Cents>,
    pub status_line: Option<CtaStatusLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBarView {
    pub token_count: u32,
    pub days_until_next: u32,
    pub benefit: TokenBenefit,
    pub discount: Percentage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionBanner {
    pub percentage: Percentage,
    pub remaining_seconds: u64,
    pub countdown: String,
}

/// Renders the page.
pub fn render(profile: &Profile, state: &PageEntitlementState) -> PageView {
    let promotion = state.promotion();
    let snapshot = state.snapshot();

    let items = profile
        .items
        .iter()
        .map(|item| {
            let gate = state.gate(&item.id);
            let unlocked = gate.access.is_unlocked();
            let price_badge = (!unlocked && item.is_for_sale()).then(|| PriceBadge {
                amount: pricing::display_price(item, promotion),
                original: promotion.applies().then_some(item.base_price),
            });
            ItemView {
                id: item.id.clone(),
                title: item.title.clone(),
                kind: item.kind,
                access: gate.access,
                media_ref: if unlocked {
                    item.media.full.clone()
                } else {
                    item.media.preview.clone()
                },
                show_lock: !unlocked,
                price_badge,
                owned: unlocked && gate.reason == Some(UnlockReason::Purchased),
                unlock_reason: if unlocked { gate.reason } else { None },
                purchasable: !unlocked && item.is_for_sale(),
            }
        })
        .collect();

    let cta_state = state.cta();
    let free_profile = profile.is_free();
    let status_line = match (&snapshot.membership, cta_state) {
        (Some(m), CtaState::Subscribed) => m.current_period_end.map(|end| CtaStatusLine {
            kind: CtaStatusKind::RenewsOn,
            date: end.display_date(),
        }),
        (Some(m), CtaState::Renew) => m.current_period_end.map(|end| CtaStatusLine {
            kind: CtaStatusKind::EndsOn,
            date: end.display_date(),
        }),
        _ => None,
    };
    let cta = CtaView {
        state: cta_state,
        label: cta_state.label(free_profile).to_string(),
        intent: cta_state.intent(free_profile),
        membership_price: profile.membership_price.filter(|p| !p.is_zero()),
        status_line,
    };

    let token_bar = snapshot.has_membership.then(|| {
        let (token_count, days_until_next) = snapshot
            .tokens
            .as_ref()
            .map_or((0, DEFAULT_DAYS_UNTIL_NEXT_TOKEN), |t| (t.token_count, t.days_remaining));
        let benefit = TokenBenefit::for_count(token_count);
        TokenBarView {
            token_count,
            days_until_next,
            benefit,
            discount: benefit.discount(),
        }
    });

    let promotion_banner = promotion.applies().then(|| PromotionBanner {
        percentage: promotion.percentage,
        remaining_seconds: promotion.window.remaining_seconds,
        countdown: promotion.window.countdown_text(),
    });

    PageView {
        profile_id: profile.id.clone(),
        display_name: profile.display_name.clone(),
        items,
        cta,
        token_bar,
        promotion: promotion_banner,
        status: state.status(),
        soft_error: state.has_soft_error(),
    }
}
