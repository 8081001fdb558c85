//! Verification service port.
//!
//! The backend of record for memberships, purchases, and tokens. The client
//! only ever mirrors what this service returns.

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::domain::credential::Credential;
use crate::domain::entitlement::VerifiedAccount;
use crate::domain::foundation::{ProfileId, UserId};

use super::ServiceError;

#[async_trait]
pub trait VerificationService: Send + Sync {
    /// Resolves everything the token's owner holds, across all profiles.
    async fn verify_token(&self, access_token: &SecretString) -> Result<VerifiedAccount, ServiceError>;

    /// Confirms a checkout session server-side and issues a fresh credential.
    ///
    /// Safe to call repeatedly for the same session.
    async fn verify_checkout_session(
        &self,
        request: VerifySessionRequest,
    ) -> Result<Credential, ServiceError>;

    /// Grants any tokens that have accrued since the last award, for every
    /// member. Best-effort; returns how many were awarded.
    async fn award_pending_tokens(&self) -> Result<u32, ServiceError>;

    /// Trades a refresh token for a new access token. The refresh token
    /// carries over unless the backend rotates it.
    async fn refresh_access_token(&self, refresh_token: &SecretString) -> Result<Credential, ServiceError>;

    /// Revokes the refresh token.
    async fn logout(&self, refresh_token: &SecretString) -> Result<(), ServiceError>;

    /// Permanently deletes the account and everything it holds.
    async fn delete_account(&self, user_id: &UserId) -> Result<(), ServiceError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifySessionRequest {
    pub session_id: String,
    pub profile_id: ProfileId,
}
