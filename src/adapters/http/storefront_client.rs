//! reqwest client for the storefront backend.
//!
//! Implements both backend ports. Every endpoint is a JSON `POST` returning
//! the `{success, data, message}` envelope.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::adapters::auth::credential_from_tokens;
use crate::domain::credential::Credential;
use crate::domain::entitlement::VerifiedAccount;
use crate::domain::foundation::UserId;
use crate::ports::{
    CheckoutRedirect, CheckoutService, ContentCheckoutRequest, FreeMembershipRequest,
    MembershipCheckoutRequest, ServiceError, TokenUnlockRequest, VerificationService,
    VerifySessionRequest,
};

use super::wire::{
    AwardData, ContentSessionBody, DeleteAccountBody, Envelope, FreeMembershipBody, IssuedTokensData,
    LogoutBody, MembershipSessionBody, PortalBody, RefreshTokenBody, SessionUrlData, TokenUnlockBody,
    VerifySessionBody, VerifyTokenBody, VerifyTokenData,
};

const VERIFY_TOKEN: &str = "auth/verify-token";
const VERIFY_SESSION: &str = "auth/verify-session";
const REFRESH_TOKEN: &str = "auth/refresh-token";
const LOGOUT: &str = "auth/logout";
const DELETE_ACCOUNT: &str = "auth/delete-account";
const CREATE_FREE_MEMBERSHIP: &str = "auth/create-free-membership";
const CREATE_MEMBERSHIP_SESSION: &str = "stripe/create-membership-session";
const CREATE_CONTENT_SESSION: &str = "stripe/create-content-checkout-session";
const UNLOCK_WITH_TOKENS: &str = "stripe/unlock-content-with-tokens";
const CREATE_PORTAL_SESSION: &str = "stripe/create-portal-session";
const AWARD_PENDING: &str = "purchase-tokens/award-pending";

/// Connection settings for [`StorefrontClient`].
#[derive(Debug, Clone)]
pub struct StorefrontClientConfig {
    pub base_url: Url,
    pub timeout: Duration,
    /// Sent as `x-api-key` on the token award call.
    pub internal_api_key: Option<SecretString>,
}

impl StorefrontClientConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(10),
            internal_api_key: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_internal_api_key(mut self, key: SecretString) -> Self {
        self.internal_api_key = Some(key);
        self
    }
}

/// HTTP adapter for [`VerificationService`] and [`CheckoutService`].
pub struct StorefrontClient {
    http: reqwest::Client,
    base_url: Url,
    internal_api_key: Option<SecretString>,
}

impl StorefrontClient {
    pub fn new(config: StorefrontClientConfig) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ServiceError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: with_trailing_slash(config.base_url),
            internal_api_key: config.internal_api_key,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        self.base_url
            .join(path)
            .map_err(|e| ServiceError::invalid_response(format!("Bad endpoint '{}': {}", path, e)))
    }

    async fn send<B>(
        &self,
        path: &str,
        body: &B,
        api_key: Option<&SecretString>,
    ) -> Result<(StatusCode, String), ServiceError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let url = self.endpoint(path)?;
        let mut request = self.http.post(url).json(body);
        if let Some(key) = api_key {
            request = request.header("x-api-key", key.expose_secret().as_str());
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(endpoint = path, error = %e, "Storefront request failed");
            if e.is_timeout() {
                ServiceError::timeout(format!("{} timed out", path))
            } else {
                ServiceError::network(format!("{}: {}", path, e))
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ServiceError::network(format!("{}: failed to read body: {}", path, e)))?;
        Ok((status, text))
    }

    /// Posts `body` and returns the envelope's `data`.
    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ServiceError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.post_with_key(path, body, None).await
    }

    async fn post_with_key<B, T>(
        &self,
        path: &str,
        body: &B,
        api_key: Option<&SecretString>,
    ) -> Result<T, ServiceError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let (status, text) = self.send(path, body, api_key).await?;
        let envelope = check_envelope::<T>(path, status, &text)?;
        envelope
            .data
            .ok_or_else(|| ServiceError::invalid_response(format!("{}: response has no data", path)))
    }

    /// Posts `body` where only the success flag matters.
    async fn post_unit<B>(&self, path: &str, body: &B) -> Result<(), ServiceError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let (status, text) = self.send(path, body, None).await?;
        check_envelope::<serde_json::Value>(path, status, &text).map(|_| ())
    }
}

/// Maps status and envelope into a `ServiceError`, or returns the envelope.
fn check_envelope<T: DeserializeOwned>(
    path: &str,
    status: StatusCode,
    text: &str,
) -> Result<Envelope<T>, ServiceError> {
    let parsed = serde_json::from_str::<Envelope<T>>(text);

    if !status.is_success() {
        let reason = match &parsed {
            Ok(envelope) => envelope.reason(),
            Err(_) => status.to_string(),
        };
        let err = match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ServiceError::unauthorized(reason),
            s if s.is_server_error() => ServiceError::server(reason),
            _ => ServiceError::rejected(reason),
        };
        tracing::warn!(endpoint = path, status = status.as_u16(), code = %err.code, "Storefront returned an error");
        return Err(err.with_status(status.as_u16()));
    }

    let envelope = parsed.map_err(|e| {
        tracing::error!(endpoint = path, error = %e, "Unreadable storefront response");
        ServiceError::invalid_response(format!("{}: {}", path, e))
    })?;

    if !envelope.success {
        return Err(ServiceError::rejected(envelope.reason()).with_status(status.as_u16()));
    }
    Ok(envelope)
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn parse_redirect(path: &str, data: SessionUrlData) -> Result<CheckoutRedirect, ServiceError> {
    let url = Url::parse(&data.url)
        .map_err(|e| ServiceError::invalid_response(format!("{}: bad redirect URL: {}", path, e)))?;
    Ok(CheckoutRedirect {
        session_id: data.session_id,
        url,
    })
}

#[async_trait]
impl VerificationService for StorefrontClient {
    async fn verify_token(&self, access_token: &SecretString) -> Result<VerifiedAccount, ServiceError> {
        let body = VerifyTokenBody {
            token: access_token.expose_secret(),
        };
        let data: VerifyTokenData = self.post(VERIFY_TOKEN, &body).await?;
        if !data.valid {
            let reason = data.reason.unwrap_or_else(|| "Token is invalid".to_string());
            return Err(ServiceError::unauthorized(reason));
        }
        Ok(data.into_account())
    }

    async fn verify_checkout_session(
        &self,
        request: VerifySessionRequest,
    ) -> Result<Credential, ServiceError> {
        let body = VerifySessionBody {
            session_id: &request.session_id,
            profile_id: request.profile_id.as_str(),
        };
        let data: IssuedTokensData = self.post(VERIFY_SESSION, &body).await?;
        let user = data.user.and_then(|u| u.into_domain());
        Ok(credential_from_tokens(data.access_token, data.refresh_token, user.as_ref()))
    }

    async fn award_pending_tokens(&self) -> Result<u32, ServiceError> {
        let data: AwardData = self
            .post_with_key(AWARD_PENDING, &serde_json::json!({}), self.internal_api_key.as_ref())
            .await?;
        Ok(data.awarded_count)
    }

    async fn refresh_access_token(&self, refresh_token: &SecretString) -> Result<Credential, ServiceError> {
        let body = RefreshTokenBody {
            refresh_token: refresh_token.expose_secret(),
        };
        let data: IssuedTokensData = self.post(REFRESH_TOKEN, &body).await?;
        let user = data.user.and_then(|u| u.into_domain());
        let refresh = data
            .refresh_token
            .unwrap_or_else(|| refresh_token.expose_secret().clone());
        Ok(credential_from_tokens(data.access_token, Some(refresh), user.as_ref()))
    }

    async fn logout(&self, refresh_token: &SecretString) -> Result<(), ServiceError> {
        let body = LogoutBody {
            refresh_token: refresh_token.expose_secret(),
        };
        self.post_unit(LOGOUT, &body).await
    }

    async fn delete_account(&self, user_id: &UserId) -> Result<(), ServiceError> {
        let body = DeleteAccountBody {
            user_id: user_id.as_str(),
            confirm_delete: true,
        };
        self.post_unit(DELETE_ACCOUNT, &body).await
    }
}

#[async_trait]
impl CheckoutService for StorefrontClient {
    async fn create_membership_session(
        &self,
        request: MembershipCheckoutRequest,
    ) -> Result<CheckoutRedirect, ServiceError> {
        let body = MembershipSessionBody {
            profile_id: request.profile_id.as_str(),
            membership_price: request.membership_price.value(),
            customer_email: request.customer_email.as_deref(),
            language: &request.language,
            display_name: &request.display_name,
        };
        let data: SessionUrlData = self.post(CREATE_MEMBERSHIP_SESSION, &body).await?;
        parse_redirect(CREATE_MEMBERSHIP_SESSION, data)
    }

    async fn create_content_session(
        &self,
        request: ContentCheckoutRequest,
    ) -> Result<CheckoutRedirect, ServiceError> {
        let body = ContentSessionBody {
            profile_id: request.profile_id.as_str(),
            video_id: request.video_id.as_str(),
            content_price: request.amount_due.value(),
            tokens_to_use: request.tokens_to_use,
            customer_email: request.customer_email.as_deref(),
            language: &request.language,
            video_title: &request.video_title,
            creator_display_name: &request.creator_display_name,
        };
        let data: SessionUrlData = self.post(CREATE_CONTENT_SESSION, &body).await?;
        parse_redirect(CREATE_CONTENT_SESSION, data)
    }

    async fn unlock_with_tokens(&self, request: TokenUnlockRequest) -> Result<(), ServiceError> {
        let body = TokenUnlockBody {
            profile_id: request.profile_id().as_str(),
            video_id: request.video_id().as_str(),
            customer_email: request.customer_email(),
            tokens_to_use: request.tokens_to_use(),
        };
        self.post_unit(UNLOCK_WITH_TOKENS, &body).await
    }

    async fn create_free_membership(&self, request: FreeMembershipRequest) -> Result<(), ServiceError> {
        let body = FreeMembershipBody {
            profile_id: request.profile_id.as_str(),
            token: request.access_token.expose_secret(),
        };
        self.post_unit(CREATE_FREE_MEMBERSHIP, &body).await
    }

    async fn create_portal_session(&self, customer_email: &str) -> Result<CheckoutRedirect, ServiceError> {
        let body = PortalBody { customer_email };
        let data: SessionUrlData = self.post(CREATE_PORTAL_SESSION, &body).await?;
        parse_redirect(CREATE_PORTAL_SESSION, data)
    }
}
