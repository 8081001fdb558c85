//! One-off purchases and loyalty tokens.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Cents, Percentage, ProfileId, Timestamp, VideoId};

/// Tokens consumed by a free unlock.
pub const FREE_UNLOCK_TOKEN_COST: u32 = 2;

/// Days between token accruals shown when no token record exists yet.
pub const DEFAULT_DAYS_UNTIL_NEXT_TOKEN: u32 = 30;

/// A permanent one-off unlock of a single item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchasedContent {
    pub profile_id: ProfileId,
    pub video_id: VideoId,
    #[serde(default)]
    pub amount: Cents,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

/// Loyalty-token balance for one profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseTokens {
    pub profile_id: ProfileId,
    pub token_count: u32,
    /// Days until the next token accrues.
    pub days_remaining: u32,
}

impl PurchaseTokens {
    pub fn benefit(&self) -> TokenBenefit {
        TokenBenefit::for_count(self.token_count)
    }

    pub fn can_free_unlock(&self) -> bool {
        self.token_count >= FREE_UNLOCK_TOKEN_COST
    }
}

/// What the current token balance is worth on the next paid item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenBenefit {
    None,
    HalfPrice,
    FreeUnlock,
}

impl TokenBenefit {
    pub fn for_count(count: u32) -> Self {
        match count {
            0 => TokenBenefit::None,
            1 => TokenBenefit::HalfPrice,
            _ => TokenBenefit::FreeUnlock,
        }
    }

    /// Discount expressed as a percentage, for the token bar label.
    pub fn discount(&self) -> Percentage {
        match self {
            TokenBenefit::None => Percentage::ZERO,
            TokenBenefit::HalfPrice => Percentage::HALF,
            TokenBenefit::FreeUnlock => Percentage::HUNDRED,
        }
    }
}
