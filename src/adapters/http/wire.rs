//! JSON shapes exchanged with the storefront backend.
//!
//! Every response is wrapped as `{success, data, message}`. Rows that fail
//! domain validation are dropped with a warning rather than failing the
//! whole verification.

use serde::{Deserialize, Serialize};

use crate::domain::entitlement::{
    AccountUser, PurchaseTokens, PurchasedContent, VerifiedAccount, DEFAULT_DAYS_UNTIL_NEXT_TOKEN,
};
use crate::domain::foundation::{Cents, ProfileId, Timestamp, UserId, VideoId};
use crate::domain::membership::{Membership, MembershipStatus};

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// Best human-readable reason the backend gave.
    pub fn reason(&self) -> String {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "request was not successful".to_string())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
pub struct VerifyTokenBody<'a> {
    pub token: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifySessionBody<'a> {
    pub session_id: &'a str,
    pub profile_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutBody<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenBody<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAccountBody<'a> {
    pub user_id: &'a str,
    pub confirm_delete: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeMembershipBody<'a> {
    pub profile_id: &'a str,
    pub token: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipSessionBody<'a> {
    pub profile_id: &'a str,
    pub membership_price: u64,
    pub customer_email: Option<&'a str>,
    pub language: &'a str,
    pub display_name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSessionBody<'a> {
    pub profile_id: &'a str,
    pub video_id: &'a str,
    pub content_price: u64,
    pub tokens_to_use: u32,
    pub customer_email: Option<&'a str>,
    pub language: &'a str,
    pub video_title: &'a str,
    pub creator_display_name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUnlockBody<'a> {
    pub profile_id: &'a str,
    pub video_id: &'a str,
    pub customer_email: &'a str,
    pub tokens_to_use: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalBody<'a> {
    pub customer_email: &'a str,
}

// ════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl WireUser {
    pub fn into_domain(self) -> Option<AccountUser> {
        Some(AccountUser {
            id: UserId::new(self.id).ok()?,
            email: self.email,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMembership {
    pub profile_id: String,
    pub status: MembershipStatus,
    #[serde(default)]
    pub cancel_at_period_end: bool,
    #[serde(default)]
    pub current_period_end: Option<String>,
    #[serde(default)]
    pub promotion_expires_at: Option<String>,
}

impl WireMembership {
    pub fn into_domain(self) -> Option<Membership> {
        Some(Membership {
            profile_id: ProfileId::new(self.profile_id).ok()?,
            status: self.status,
            cancel_at_period_end: self.cancel_at_period_end,
            current_period_end: self.current_period_end.as_deref().and_then(Timestamp::parse_rfc3339),
            promotion_expires_at: self
                .promotion_expires_at
                .as_deref()
                .and_then(Timestamp::parse_rfc3339),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePurchase {
    pub profile_id: String,
    pub video_id: String,
    #[serde(default)]
    pub amount: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl WirePurchase {
    pub fn into_domain(self) -> Option<PurchasedContent> {
        Some(PurchasedContent {
            profile_id: ProfileId::new(self.profile_id).ok()?,
            video_id: VideoId::new(self.video_id).ok()?,
            amount: Cents::new(self.amount.unwrap_or(0)),
            created_at: self.created_at.as_deref().and_then(Timestamp::parse_rfc3339),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTokens {
    pub profile_id: String,
    #[serde(default)]
    pub token_count: u32,
    #[serde(default = "default_days_remaining")]
    pub days_remaining: u32,
}

fn default_days_remaining() -> u32 {
    DEFAULT_DAYS_UNTIL_NEXT_TOKEN
}

impl WireTokens {
    pub fn into_domain(self) -> Option<PurchaseTokens> {
        Some(PurchaseTokens {
            profile_id: ProfileId::new(self.profile_id).ok()?,
            token_count: self.token_count,
            days_remaining: self.days_remaining,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTokenData {
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub user: Option<WireUser>,
    #[serde(default)]
    pub memberships: Vec<WireMembership>,
    #[serde(default)]
    pub purchased_content: Vec<WirePurchase>,
    #[serde(default)]
    pub purchase_tokens: Vec<WireTokens>,
}

impl VerifyTokenData {
    /// Converts to the domain account, dropping rows that fail validation.
    pub fn into_account(self) -> VerifiedAccount {
        fn keep<W, D>(rows: Vec<W>, kind: &str, convert: impl Fn(W) -> Option<D>) -> Vec<D> {
            let total = rows.len();
            let kept: Vec<D> = rows.into_iter().filter_map(convert).collect();
            if kept.len() < total {
                tracing::warn!(kind, dropped = total - kept.len(), "Dropped invalid rows from verify-token");
            }
            kept
        }

        VerifiedAccount {
            user: self.user.and_then(WireUser::into_domain),
            memberships: keep(self.memberships, "membership", WireMembership::into_domain),
            purchased_content: keep(self.purchased_content, "purchase", WirePurchase::into_domain),
            purchase_tokens: keep(self.purchase_tokens, "tokens", WireTokens::into_domain),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedTokensData {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<WireUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUrlData {
    #[serde(default)]
    pub session_id: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardData {
    #[serde(default)]
    pub awarded_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn verify_token_payload_maps_to_domain() {
        let body = json!({
            "success": true,
            "data": {
                "valid": true,
                "user": { "id": "u1", "email": "fan@example.com" },
                "memberships": [{
                    "profileId": "profile1",
                    "status": "active",
                    "cancelAtPeriodEnd": true,
                    "currentPeriodEnd": "2026-02-15T00:00:00.000Z",
                    "promotionExpiresAt": null
                }],
                "purchasedContent": [{ "profileId": "profile1", "videoId": "video3", "amount": 580 }],
                "purchaseTokens": [{ "profileId": "profile1", "tokenCount": 2, "daysRemaining": 12 }]
            }
        });

        let envelope: Envelope<VerifyTokenData> = serde_json::from_value(body).unwrap();
        assert!(envelope.success);
        let account = envelope.data.unwrap().into_account();

        assert_eq!(account.user.unwrap().email.as_deref(), Some("fan@example.com"));
        let m = &account.memberships[0];
        assert!(m.cancel_at_period_end);
        assert_eq!(m.current_period_end.unwrap().display_date(), "Feb 15, 2026");
        assert!(m.promotion_expires_at.is_none());
        assert_eq!(account.purchased_content[0].amount, Cents::new(580));
        assert_eq!(account.purchase_tokens[0].token_count, 2);
    }

    #[test]
    fn rows_with_empty_ids_are_dropped() {
        let data = VerifyTokenData {
            purchased_content: vec![
                WirePurchase {
                    profile_id: "profile1".into(),
                    video_id: "".into(),
                    amount: None,
                    created_at: None,
                },
                WirePurchase {
                    profile_id: "profile1".into(),
                    video_id: "video1".into(),
                    amount: None,
                    created_at: None,
                },
            ],
            ..Default::default()
        };
        assert_eq!(data.into_account().purchased_content.len(), 1);
    }

    #[test]
    fn missing_days_remaining_defaults_to_thirty() {
        let t: WireTokens = serde_json::from_value(json!({ "profileId": "p", "tokenCount": 0 })).unwrap();
        assert_eq!(t.days_remaining, 30);
    }

    #[test]
    fn request_bodies_are_camel_case() {
        let body = ContentSessionBody {
            profile_id: "profile1",
            video_id: "video3",
            content_price: 350,
            tokens_to_use: 1,
            customer_email: Some("fan@example.com"),
            language: "en",
            video_title: "Premium Content 3",
            creator_display_name: "Creator One",
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["contentPrice"], 350);
        assert_eq!(value["tokensToUse"], 1);
        assert_eq!(value["creatorDisplayName"], "Creator One");
    }

    #[test]
    fn delete_account_body_carries_explicit_confirmation() {
        let body = DeleteAccountBody {
            user_id: "user-1",
            confirm_delete: true,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "userId": "user-1", "confirmDelete": true })
        );
    }

    #[test]
    fn envelope_reason_prefers_error_field() {
        let e: Envelope<AwardData> =
            serde_json::from_value(json!({ "success": false, "error": "nope", "message": "m" })).unwrap();
        assert_eq!(e.reason(), "nope");
    }
}
