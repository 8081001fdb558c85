//! Checkout service port for external payment flows.
//!
//! The backend wraps the payment processor; the client only ever receives
//! redirect URLs or a confirmation. Return URLs are chosen by the backend.

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::domain::entitlement::FREE_UNLOCK_TOKEN_COST;
use crate::domain::foundation::{Cents, ProfileId, VideoId};

use super::ServiceError;

#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Creates a recurring membership checkout session.
    async fn create_membership_session(
        &self,
        request: MembershipCheckoutRequest,
    ) -> Result<CheckoutRedirect, ServiceError>;

    /// Creates a one-off checkout session for a single item at `amount_due`.
    async fn create_content_session(
        &self,
        request: ContentCheckoutRequest,
    ) -> Result<CheckoutRedirect, ServiceError>;

    /// Unlocks an item by spending tokens, without external payment.
    async fn unlock_with_tokens(&self, request: TokenUnlockRequest) -> Result<(), ServiceError>;

    /// Joins a zero-price profile.
    async fn create_free_membership(&self, request: FreeMembershipRequest) -> Result<(), ServiceError>;

    /// Opens the subscription-management surface.
    async fn create_portal_session(&self, customer_email: &str) -> Result<CheckoutRedirect, ServiceError>;
}

/// Where to send the viewer to complete a checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRedirect {
    pub session_id: Option<String>,
    pub url: Url,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipCheckoutRequest {
    pub profile_id: ProfileId,
    pub membership_price: Cents,
    pub customer_email: Option<String>,
    pub language: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentCheckoutRequest {
    pub profile_id: ProfileId,
    pub video_id: VideoId,
    /// Resolved amount; the backend charges exactly this.
    pub amount_due: Cents,
    /// 0 or 1; spent server-side only if checkout completes.
    pub tokens_to_use: u32,
    pub customer_email: Option<String>,
    pub language: String,
    pub video_title: String,
    pub creator_display_name: String,
}

/// A token unlock rejected before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenUnlockRejection {
    #[error("A token unlock must use exactly {required} tokens, not {requested}")]
    WrongTokenCount { requested: u32, required: u32 },

    #[error("A token unlock needs {required} tokens but only {balance} are available")]
    InsufficientBalance { balance: u32, required: u32 },

    #[error("A token unlock needs the account email")]
    MissingEmail,
}

/// Request to unlock one item with tokens.
///
/// Only constructible through [`TokenUnlockRequest::new`], which enforces
/// the exact token count and a sufficient balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenUnlockRequest {
    profile_id: ProfileId,
    video_id: VideoId,
    customer_email: String,
    tokens_to_use: u32,
}

impl TokenUnlockRequest {
    pub fn new(
        profile_id: ProfileId,
        video_id: VideoId,
        customer_email: Option<String>,
        tokens_to_use: u32,
        balance: u32,
    ) -> Result<Self, TokenUnlockRejection> {
        if tokens_to_use != FREE_UNLOCK_TOKEN_COST {
            return Err(TokenUnlockRejection::WrongTokenCount {
                requested: tokens_to_use,
                required: FREE_UNLOCK_TOKEN_COST,
            });
        }
        if balance < FREE_UNLOCK_TOKEN_COST {
            return Err(TokenUnlockRejection::InsufficientBalance {
                balance,
                required: FREE_UNLOCK_TOKEN_COST,
            });
        }
        let customer_email = customer_email
            .filter(|e| !e.is_empty())
            .ok_or(TokenUnlockRejection::MissingEmail)?;
        Ok(Self {
            profile_id,
            video_id,
            customer_email,
            tokens_to_use,
        })
    }

    pub fn profile_id(&self) -> &ProfileId {
        &self.profile_id
    }

    pub fn video_id(&self) -> &VideoId {
        &self.video_id
    }

    pub fn customer_email(&self) -> &str {
        &self.customer_email
    }

    pub fn tokens_to_use(&self) -> u32 {
        self.tokens_to_use
    }
}

#[derive(Debug, Clone)]
pub struct FreeMembershipRequest {
    pub profile_id: ProfileId,
    pub access_token: SecretString,
}
