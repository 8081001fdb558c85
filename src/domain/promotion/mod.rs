//! Promotion clock.
//!
//! A member may hold a time-boxed discount on the profile's pay-per-item
//! content. The window is evaluated against an injected `now`; the caller
//! owns the countdown and the forced re-resolution when it reaches zero.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Percentage, Timestamp};
use crate::domain::membership::Membership;

/// Whether a promotion is running and how long is left.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionWindow {
    pub active: bool,
    pub remaining_seconds: u64,
}

impl PromotionWindow {
    pub const INACTIVE: Self = Self {
        active: false,
        remaining_seconds: 0,
    };

    /// Evaluates the membership's promotion at `now`.
    ///
    /// Remaining time is floored to whole seconds; a window with less than
    /// one whole second left is already inactive.
    pub fn evaluate(membership: Option<&Membership>, now: &Timestamp) -> Self {
        let Some(expires_at) = membership.and_then(|m| m.promotion_expires_at) else {
            return Self::INACTIVE;
        };
        let remaining_seconds = expires_at.whole_seconds_after(now);
        Self {
            active: remaining_seconds > 0,
            remaining_seconds,
        }
    }

    /// Countdown text `MM:SS`; minutes are not wrapped into hours.
    pub fn countdown_text(&self) -> String {
        format_countdown(self.remaining_seconds)
    }
}

/// Formats seconds as `MM:SS`, minutes unbounded.
pub fn format_countdown(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// A promotion window paired with the profile's discount magnitude.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionOffer {
    pub window: PromotionWindow,
    pub percentage: Percentage,
}

impl PromotionOffer {
    pub fn new(window: PromotionWindow, percentage: Percentage) -> Self {
        Self { window, percentage }
    }

    pub fn none() -> Self {
        Self::default()
    }

    /// True when the discount changes prices right now.
    pub fn applies(&self) -> bool {
        self.window.active && !self.percentage.is_zero()
    }
}
