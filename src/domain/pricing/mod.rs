//! Pricing resolver.
//!
//! Turns an item's base price, the viewer's token balance, and the current
//! promotion into the amount actually charged. The rules are applied in a
//! fixed priority order:
//!
//! 1. two or more tokens: free unlock consuming exactly two tokens
//! 2. exactly one token: half price, the token is spent only if checkout succeeds
//! 3. active promotion with a non-zero percentage: promotional price
//! 4. base price
//!
//! Every discount uses integer round-half-up on minor units
//! (see [`Percentage::apply_discount`]).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::catalog::ContentItem;
use crate::domain::entitlement::FREE_UNLOCK_TOKEN_COST;
use crate::domain::foundation::{Cents, Percentage, VideoId};
use crate::domain::promotion::PromotionOffer;

/// Which priority rule produced a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceRule {
    TokenFreeUnlock,
    TokenHalfPrice,
    Promotion,
    BasePrice,
}

/// Result of pricing one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub amount_due: Cents,
    pub tokens_to_consume: u32,
    pub free_unlock: bool,
    pub rule: PriceRule,
    pub base_price: Cents,
}

impl PriceQuote {
    /// True when the quote goes through external payment.
    pub fn requires_payment(&self) -> bool {
        !self.free_unlock
    }

    /// True when the charged amount is below the base price.
    pub fn is_discounted(&self) -> bool {
        self.amount_due < self.base_price
    }
}

/// Pricing faults. A zero or negative paid amount is a logic fault, never a
/// free path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("Item '{video_id}' is not sold individually")]
    NotForSale { video_id: VideoId },

    #[error("Computed amount for '{video_id}' under {rule:?} is below one minor unit")]
    NonPositiveAmount { video_id: VideoId, rule: PriceRule },
}

/// Prices `item` for a viewer holding `token_count` tokens.
pub fn quote(
    item: &ContentItem,
    token_count: u32,
    promotion: &PromotionOffer,
) -> Result<PriceQuote, PricingError> {
    if !item.is_for_sale() {
        return Err(PricingError::NotForSale {
            video_id: item.id.clone(),
        });
    }
    let base_price = item.base_price;

    if token_count >= FREE_UNLOCK_TOKEN_COST {
        return Ok(PriceQuote {
            amount_due: Cents::ZERO,
            tokens_to_consume: FREE_UNLOCK_TOKEN_COST,
            free_unlock: true,
            rule: PriceRule::TokenFreeUnlock,
            base_price,
        });
    }

    let (amount_due, tokens_to_consume, rule) = if token_count == 1 {
        (Percentage::HALF.apply_discount(base_price), 1, PriceRule::TokenHalfPrice)
    } else if promotion.applies() {
        (promotion.percentage.apply_discount(base_price), 0, PriceRule::Promotion)
    } else {
        (base_price, 0, PriceRule::BasePrice)
    };

    if amount_due.is_zero() {
        return Err(PricingError::NonPositiveAmount {
            video_id: item.id.clone(),
            rule,
        });
    }

    Ok(PriceQuote {
        amount_due,
        tokens_to_consume,
        free_unlock: false,
        rule,
        base_price,
    })
}

/// Price to display on a locked item's badge: the promotional price while a
/// promotion applies, otherwise the base price. Token benefits are shown in
/// the token bar rather than on every badge.
pub fn display_price(item: &ContentItem, promotion: &PromotionOffer) -> Cents {
    if promotion.applies() {
        promotion.percentage.apply_discount(item.base_price)
    } else {
        item.base_price
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{ContentKind, MediaRefs};
    use crate::domain::promotion::PromotionWindow;
    use proptest::prelude::*;

    fn paid(price: u64) -> ContentItem {
        ContentItem {
            id: VideoId::new("video3").unwrap(),
            title: "Premium Content 3".to_string(),
            kind: ContentKind::Paid,
            base_price: Cents::new(price),
            media: MediaRefs {
                preview: "/previews/video3.mp4".to_string(),
                full: "/videos/video3.mp4".to_string(),
            },
        }
    }

    fn promo(pct: u8) -> PromotionOffer {
        PromotionOffer::new(
            PromotionWindow {
                active: true,
                remaining_seconds: 600,
            },
            Percentage::new(pct),
        )
    }

    // ════════════════════════════════════════════════════════════════
    // Priority order
    // ════════════════════════════════════════════════════════════════

    #[test]
    fn two_tokens_beat_an_active_promotion() {
        let q = quote(&paid(699), 2, &promo(20)).unwrap();
        assert!(q.free_unlock);
        assert_eq!(q.rule, PriceRule::TokenFreeUnlock);
        assert_eq!(q.tokens_to_consume, 2);
        assert_eq!(q.amount_due, Cents::ZERO);
        assert!(!q.requires_payment());
    }

    #[test]
    fn many_tokens_still_consume_exactly_two() {
        let q = quote(&paid(699), 9, &PromotionOffer::none()).unwrap();
        assert_eq!(q.tokens_to_consume, 2);
    }

    #[test]
    fn one_token_halves_699_to_350_regardless_of_promotion() {
        for offer in [PromotionOffer::none(), promo(17), promo(90)] {
            let q = quote(&paid(699), 1, &offer).unwrap();
            assert_eq!(q.amount_due, Cents::new(350));
            assert_eq!(q.tokens_to_consume, 1);
            assert_eq!(q.rule, PriceRule::TokenHalfPrice);
        }
    }

    #[test]
    fn promotion_17_percent_on_699_is_580() {
        let q = quote(&paid(699), 0, &promo(17)).unwrap();
        assert_eq!(q.amount_due, Cents::new(580));
        assert_eq!(q.tokens_to_consume, 0);
        assert_eq!(q.rule, PriceRule::Promotion);
        assert!(q.is_discounted());
    }

    #[test]
    fn zero_percent_promotion_falls_through_to_base() {
        let q = quote(&paid(699), 0, &promo(0)).unwrap();
        assert_eq!(q.rule, PriceRule::BasePrice);
        assert_eq!(q.amount_due, Cents::new(699));
    }

    #[test]
    fn inactive_promotion_falls_through_to_base() {
        let offer = PromotionOffer::new(PromotionWindow::INACTIVE, Percentage::new(50));
        let q = quote(&paid(699), 0, &offer).unwrap();
        assert_eq!(q.rule, PriceRule::BasePrice);
    }

    // ════════════════════════════════════════════════════════════════
    // Faults
    // ════════════════════════════════════════════════════════════════

    #[test]
    fn full_promotion_discount_is_a_fault_not_a_free_path() {
        let err = quote(&paid(699), 0, &promo(100)).unwrap_err();
        assert!(matches!(
            err,
            PricingError::NonPositiveAmount {
                rule: PriceRule::Promotion,
                ..
            }
        ));
    }

    #[test]
    fn membership_items_are_not_for_sale() {
        let mut item = paid(699);
        item.kind = ContentKind::Membership;
        assert!(matches!(
            quote(&item, 0, &PromotionOffer::none()),
            Err(PricingError::NotForSale { .. })
        ));
    }

    #[test]
    fn zero_priced_paid_item_is_not_for_sale() {
        assert!(quote(&paid(0), 2, &PromotionOffer::none()).is_err());
    }

    #[test]
    fn display_price_shows_promotion_only() {
        assert_eq!(display_price(&paid(699), &promo(17)), Cents::new(580));
        assert_eq!(display_price(&paid(699), &PromotionOffer::none()), Cents::new(699));
    }

    // ════════════════════════════════════════════════════════════════
    // Properties
    // ════════════════════════════════════════════════════════════════

    proptest! {
        #[test]
        fn quoting_is_idempotent(price in 1u64..100_000, tokens in 0u32..5, pct in 0u8..=100, active in any::<bool>()) {
            let offer = PromotionOffer::new(
                PromotionWindow { active, remaining_seconds: if active { 60 } else { 0 } },
                Percentage::new(pct),
            );
            prop_assert_eq!(quote(&paid(price), tokens, &offer), quote(&paid(price), tokens, &offer));
        }

        #[test]
        fn paid_quotes_are_at_least_one_cent_and_never_above_base(price in 1u64..100_000, tokens in 0u32..2, pct in 0u8..100) {
            if let Ok(q) = quote(&paid(price), tokens, &promo(pct)) {
                prop_assert!(q.amount_due.value() >= 1);
                prop_assert!(q.amount_due <= q.base_price);
                prop_assert!(q.requires_payment());
            }
        }

        #[test]
        fn two_or_more_tokens_always_free_unlock(price in 1u64..100_000, tokens in 2u32..50, pct in 0u8..=100) {
            let q = quote(&paid(price), tokens, &promo(pct)).unwrap();
            prop_assert!(q.free_unlock);
            prop_assert_eq!(q.tokens_to_consume, 2);
        }
    }
}
