//! Viewer credential held by the browser session.
//!
//! Tokens are wrapped in `SecretString` so they never reach logs through
//! `Debug`.

use secrecy::{ExposeSecret, SecretString};

use crate::domain::foundation::{Timestamp, UserId};

/// Who the credential belongs to, as far as the client knows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Option<UserId>,
    pub email: Option<String>,
}

/// Access token plus optional refresh token and identity.
#[derive(Debug)]
pub struct Credential {
    access_token: SecretString,
    refresh_token: Option<SecretString>,
    identity: Identity,
    expires_at: Option<Timestamp>,
}

impl Credential {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        identity: Identity,
        expires_at: Option<Timestamp>,
    ) -> Self {
        Self {
            access_token: SecretString::new(access_token.into()),
            refresh_token: refresh_token.map(SecretString::new),
            identity,
            expires_at,
        }
    }

    pub fn access_token(&self) -> &SecretString {
        &self.access_token
    }

    pub fn refresh_token(&self) -> Option<&SecretString> {
        self.refresh_token.as_ref()
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Email used to pre-fill checkout.
    pub fn email(&self) -> Option<&str> {
        self.identity.email.as_deref()
    }

    pub fn expires_at(&self) -> Option<Timestamp> {
        self.expires_at
    }

    /// True once `now` has reached the expiry. Credentials without a known
    /// expiry never expire client-side; the backend still decides.
    pub fn is_expired(&self, now: &Timestamp) -> bool {
        self.expires_at.map_or(false, |exp| !exp.is_after(now))
    }

    /// A present, non-expired access token is required for every
    /// entitlement call.
    pub fn is_usable(&self, now: &Timestamp) -> bool {
        !self.access_token.expose_secret().is_empty() && !self.is_expired(now)
    }
}

impl Clone for Credential {
    fn clone(&self) -> Self {
        Self {
            access_token: SecretString::new(self.access_token.expose_secret().clone()),
            refresh_token: self
                .refresh_token
                .as_ref()
                .map(|t| SecretString::new(t.expose_secret().clone())),
            identity: self.identity.clone(),
            expires_at: self.expires_at,
        }
    }
}
