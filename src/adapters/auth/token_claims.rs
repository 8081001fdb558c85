//! Access-token claim decoding.
//!
//! The storefront issues JWT access tokens. The client reads two claims from
//! the payload, `email` (checkout pre-fill) and `exp` (client-side expiry),
//! without verifying the signature: the backend remains the only verifier
//! and every entitlement decision goes through it.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::credential::{Credential, Identity};
use crate::domain::entitlement::AccountUser;
use crate::domain::foundation::{Timestamp, UserId};

/// Claims the client cares about. Everything else is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    #[serde(default, rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Expiry, Unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl TokenClaims {
    pub fn expires_at(&self) -> Option<Timestamp> {
        self.exp.and_then(Timestamp::from_unix_secs)
    }

    fn subject(&self) -> Option<UserId> {
        self.user_id
            .as_deref()
            .or(self.sub.as_deref())
            .and_then(|id| UserId::new(id).ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimsError {
    #[error("Access token is not a readable JWT: {0}")]
    Malformed(String),
}

/// Reads the payload claims without checking the signature or expiry.
pub fn decode_claims(token: &str) -> Result<TokenClaims, ClaimsError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| ClaimsError::Malformed(e.to_string()))
}

/// Signs claims with HS256. Used by the in-process storefront fake.
pub fn encode_claims(claims: &TokenClaims, secret: &[u8]) -> Result<String, ClaimsError> {
    encode(&Header::new(Algorithm::HS256), claims, &EncodingKey::from_secret(secret))
        .map_err(|e| ClaimsError::Malformed(e.to_string()))
}

/// Builds a credential from freshly issued tokens.
///
/// Identity prefers what the backend echoed over the token payload. A token
/// whose payload cannot be read still yields a credential with no known
/// expiry; the backend will reject it if it is bad.
pub fn credential_from_tokens(
    access_token: String,
    refresh_token: Option<String>,
    user: Option<&AccountUser>,
) -> Credential {
    let claims = match decode_claims(&access_token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "Access token payload unreadable");
            TokenClaims::default()
        }
    };

    let identity = Identity {
        user_id: user.map(|u| u.id.clone()).or_else(|| claims.subject()),
        email: user.and_then(|u| u.email.clone()).or_else(|| claims.email.clone()),
    };

    Credential::new(access_token, refresh_token, identity, claims.expires_at())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(claims: &TokenClaims) -> String {
        encode_claims(claims, b"storefront-secret").unwrap()
    }

    #[test]
    fn decodes_email_and_expiry_without_the_signing_key() {
        let claims = TokenClaims {
            sub: Some("user-1".into()),
            user_id: None,
            email: Some("fan@example.com".into()),
            exp: Some(1_900_000_000),
        };
        let decoded = decode_claims(&token(&claims)).unwrap();
        assert_eq!(decoded, claims);
        assert_eq!(decoded.expires_at().unwrap().as_unix_secs(), 1_900_000_000);
    }

    #[test]
    fn expired_tokens_still_decode() {
        let claims = TokenClaims {
            exp: Some(1_000),
            ..Default::default()
        };
        assert_eq!(decode_claims(&token(&claims)).unwrap().exp, Some(1_000));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(decode_claims("not-a-jwt"), Err(ClaimsError::Malformed(_))));
    }

    #[test]
    fn credential_prefers_echoed_user_over_claims() {
        let access = token(&TokenClaims {
            sub: Some("from-token".into()),
            email: Some("token@example.com".into()),
            exp: Some(1_900_000_000),
            ..Default::default()
        });
        let user = AccountUser {
            id: UserId::new("from-backend").unwrap(),
            email: Some("backend@example.com".into()),
        };

        let credential = credential_from_tokens(access, Some("r".into()), Some(&user));

        assert_eq!(credential.identity().user_id.as_ref().unwrap().as_str(), "from-backend");
        assert_eq!(credential.email(), Some("backend@example.com"));
        assert!(credential.expires_at().is_some());
    }

    #[test]
    fn credential_falls_back_to_claims() {
        let access = token(&TokenClaims {
            user_id: Some("u-7".into()),
            email: Some("fan@example.com".into()),
            ..Default::default()
        });
        let credential = credential_from_tokens(access, None, None);
        assert_eq!(credential.email(), Some("fan@example.com"));
        assert_eq!(credential.identity().user_id.as_ref().unwrap().as_str(), "u-7");
        assert!(credential.expires_at().is_none());
    }

    #[test]
    fn opaque_token_yields_credential_without_expiry() {
        let credential = credential_from_tokens("opaque".into(), None, None);
        assert!(credential.expires_at().is_none());
        assert!(credential.email().is_none());
    }
}
