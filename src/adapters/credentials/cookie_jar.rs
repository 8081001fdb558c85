//! Cookie-backed credential store.
//!
//! Mirrors the browser cookie jar for one page session: seeded from the
//! request's `Cookie` header, and every change is queued as a `Set-Cookie`
//! header for the response. Four cookies carry the credential; the expiry
//! is re-read from the access token's `exp` claim on load. Names and values
//! are percent-encoded on the wire.

use std::collections::BTreeMap;
use std::sync::Mutex;

use cookie::{Cookie, SameSite};
use secrecy::ExposeSecret;
use time::{Duration, OffsetDateTime};

use crate::adapters::auth::credential_from_tokens;
use crate::domain::credential::Credential;
use crate::domain::entitlement::AccountUser;
use crate::domain::foundation::UserId;
use crate::ports::{CredentialStore, CredentialStoreError};

pub const ACCESS_TOKEN_COOKIE: &str = "fp_access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "fp_refresh_token";
pub const USER_ID_COOKIE: &str = "fp_user_id";
pub const USER_EMAIL_COOKIE: &str = "fp_user_email";

const CREDENTIAL_COOKIES: [&str; 4] = [
    ACCESS_TOKEN_COOKIE,
    REFRESH_TOKEN_COOKIE,
    USER_ID_COOKIE,
    USER_EMAIL_COOKIE,
];

/// Attributes applied to every cookie written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSettings {
    pub path: String,
    pub secure: bool,
    /// Lifetime used when the access token carries no expiry.
    pub default_max_age_secs: i64,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            secure: true,
            default_max_age_secs: 7 * 24 * 60 * 60,
        }
    }
}

#[derive(Debug, Default)]
struct JarState {
    cookies: BTreeMap<String, String>,
    pending: Vec<String>,
}

#[derive(Debug)]
pub struct CookieJarStore {
    settings: CookieSettings,
    state: Mutex<JarState>,
}

enum Lifetime {
    Expires(OffsetDateTime),
    MaxAge(Duration),
}

impl CookieJarStore {
    pub fn new(settings: CookieSettings) -> Self {
        Self {
            settings,
            state: Mutex::new(JarState::default()),
        }
    }

    /// Seeds the jar from a request `Cookie` header. Unrelated cookies are
    /// kept but never touched.
    pub fn from_cookie_header(header: &str, settings: CookieSettings) -> Self {
        let store = Self::new(settings);
        if let Ok(mut state) = store.state.lock() {
            state.cookies = parse_cookie_header(header);
        }
        store
    }

    /// The `Cookie` header a follow-up request would carry.
    pub fn cookie_header(&self) -> Option<String> {
        let state = self.state.lock().ok()?;
        if state.cookies.is_empty() {
            return None;
        }
        Some(
            state
                .cookies
                .iter()
                .map(|(name, value)| Cookie::new(name.as_str(), value.as_str()).encoded().to_string())
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Drains the `Set-Cookie` headers queued since the last call.
    pub fn take_set_cookie_headers(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|mut state| std::mem::take(&mut state.pending))
            .unwrap_or_default()
    }

    fn set_cookie(&self, name: &str, value: &str, lifetime: &Lifetime) -> String {
        let builder = Cookie::build((name.to_string(), value.to_string()))
            .path(self.settings.path.clone())
            .same_site(SameSite::Lax)
            .secure(self.settings.secure);
        let cookie = match lifetime {
            Lifetime::Expires(at) => builder.expires(*at).build(),
            Lifetime::MaxAge(age) => builder.max_age(*age).build(),
        };
        cookie.encoded().to_string()
    }

    fn removal(&self, name: &str) -> String {
        self.set_cookie(name, "", &Lifetime::MaxAge(Duration::ZERO))
    }
}

fn lock_error<T>(_: T) -> CredentialStoreError {
    CredentialStoreError::Unavailable("cookie jar lock poisoned".to_string())
}

impl CredentialStore for CookieJarStore {
    fn load(&self) -> Result<Option<Credential>, CredentialStoreError> {
        let state = self.state.lock().map_err(lock_error)?;

        let access = match state.cookies.get(ACCESS_TOKEN_COOKIE) {
            Some(token) if !token.is_empty() => token.clone(),
            _ => return Ok(None),
        };
        let refresh = state
            .cookies
            .get(REFRESH_TOKEN_COOKIE)
            .filter(|t| !t.is_empty())
            .cloned();

        let user = match state.cookies.get(USER_ID_COOKIE) {
            Some(id) if !id.is_empty() => Some(AccountUser {
                id: UserId::new(id.clone())
                    .map_err(|e| CredentialStoreError::Malformed(e.to_string()))?,
                email: state.cookies.get(USER_EMAIL_COOKIE).filter(|e| !e.is_empty()).cloned(),
            }),
            _ => None,
        };

        Ok(Some(credential_from_tokens(access, refresh, user.as_ref())))
    }

    fn store(&self, credential: &Credential) -> Result<(), CredentialStoreError> {
        let mut values: Vec<(&str, String)> = vec![(
            ACCESS_TOKEN_COOKIE,
            credential.access_token().expose_secret().clone(),
        )];
        if let Some(refresh) = credential.refresh_token() {
            values.push((REFRESH_TOKEN_COOKIE, refresh.expose_secret().clone()));
        }
        if let Some(user_id) = &credential.identity().user_id {
            values.push((USER_ID_COOKIE, user_id.as_str().to_string()));
        }
        if let Some(email) = credential.email() {
            values.push((USER_EMAIL_COOKIE, email.to_string()));
        }

        let lifetime = credential
            .expires_at()
            .and_then(|exp| OffsetDateTime::from_unix_timestamp(exp.as_unix_secs()).ok())
            .map(Lifetime::Expires)
            .unwrap_or_else(|| Lifetime::MaxAge(Duration::seconds(self.settings.default_max_age_secs)));

        let mut state = self.state.lock().map_err(lock_error)?;
        for name in CREDENTIAL_COOKIES {
            if !values.iter().any(|(n, _)| *n == name) && state.cookies.remove(name).is_some() {
                let header = self.removal(name);
                state.pending.push(header);
            }
        }
        for (name, value) in values {
            let header = self.set_cookie(name, &value, &lifetime);
            state.pending.push(header);
            state.cookies.insert(name.to_string(), value);
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialStoreError> {
        let mut state = self.state.lock().map_err(lock_error)?;
        for name in CREDENTIAL_COOKIES {
            state.cookies.remove(name);
            let header = self.removal(name);
            state.pending.push(header);
        }
        Ok(())
    }
}

/// Parses a `Cookie` header into decoded name/value pairs. Unparseable
/// pairs are skipped.
pub fn parse_cookie_header(header: &str) -> BTreeMap<String, String> {
    Cookie::split_parse_encoded(header)
        .filter_map(Result::ok)
        .filter(|c| !c.name().is_empty())
        .map(|c| (c.name().to_string(), c.value_trimmed().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::{encode_claims, TokenClaims};
    use crate::domain::credential::Identity;

    fn settings() -> CookieSettings {
        CookieSettings::default()
    }

    fn jwt(email: &str, exp: i64) -> String {
        encode_claims(
            &TokenClaims {
                sub: Some("user-1".into()),
                email: Some(email.into()),
                exp: Some(exp),
                ..Default::default()
            },
            b"k",
        )
        .unwrap()
    }

    fn header_for<'a>(headers: &'a [String], name: &str) -> &'a str {
        headers
            .iter()
            .find(|h| h.starts_with(&format!("{}=", name)))
            .map(String::as_str)
            .unwrap()
    }

    #[test]
    fn parses_cookie_header_and_ignores_junk() {
        let cookies = parse_cookie_header(r#"a=1; ; b="two";c; theme=dark"#);
        assert_eq!(cookies.get("a").map(String::as_str), Some("1"));
        assert_eq!(cookies.get("b").map(String::as_str), Some("two"));
        assert!(!cookies.contains_key("c"));
        assert_eq!(cookies.len(), 3);
    }

    #[test]
    fn load_from_header_reads_tokens_identity_and_expiry() {
        let header = format!(
            "theme=dark; fp_access_token={}; fp_refresh_token=r1; fp_user_id=user-9; fp_user_email=fan%40example.com",
            jwt("token@example.com", 1_900_000_000)
        );
        let store = CookieJarStore::from_cookie_header(&header, settings());
        let credential = store.load().unwrap().unwrap();

        assert_eq!(credential.refresh_token().unwrap().expose_secret(), "r1");
        assert_eq!(credential.email(), Some("fan@example.com"));
        assert_eq!(credential.identity().user_id.as_ref().unwrap().as_str(), "user-9");
        assert_eq!(credential.expires_at().unwrap().as_unix_secs(), 1_900_000_000);
    }

    #[test]
    fn missing_or_empty_access_cookie_loads_nothing() {
        assert!(CookieJarStore::new(settings()).load().unwrap().is_none());
        let store = CookieJarStore::from_cookie_header("fp_access_token=; fp_user_id=u", settings());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn store_queues_set_cookie_headers_with_expiry() {
        let store = CookieJarStore::new(settings());
        let access = jwt("fan@example.com", 1_900_000_000);
        store
            .store(&credential_from_tokens(access.clone(), Some("r1".into()), None))
            .unwrap();

        let headers = store.take_set_cookie_headers();
        let access_header = header_for(&headers, ACCESS_TOKEN_COOKIE);
        assert!(access_header.contains(&access));
        assert!(access_header.contains("Path=/"));
        assert!(access_header.contains("Expires=Sun, 17 Mar 2030 17:46:40 GMT"));
        assert!(access_header.contains("SameSite=Lax"));
        assert!(access_header.contains("; Secure"));
        assert!(header_for(&headers, USER_EMAIL_COOKIE).starts_with("fp_user_email=fan%40example.com;"));

        assert!(store.take_set_cookie_headers().is_empty());
        assert!(store.cookie_header().unwrap().contains("fp_refresh_token=r1"));
    }

    #[test]
    fn credential_without_expiry_uses_default_max_age() {
        let store = CookieJarStore::new(CookieSettings {
            secure: false,
            ..settings()
        });
        store
            .store(&Credential::new("opaque", None, Identity::default(), None))
            .unwrap();
        let headers = store.take_set_cookie_headers();

        assert_eq!(headers.len(), 1);
        let access_header = header_for(&headers, ACCESS_TOKEN_COOKIE);
        assert!(access_header.starts_with("fp_access_token=opaque;"));
        assert!(access_header.contains("Max-Age=604800"));
        assert!(!access_header.contains("Expires="));
        assert!(!access_header.contains("Secure"));
    }

    #[test]
    fn storing_a_credential_without_refresh_expires_the_old_refresh_cookie() {
        let store = CookieJarStore::from_cookie_header("fp_access_token=old; fp_refresh_token=r0", settings());
        store
            .store(&Credential::new("new", None, Identity::default(), None))
            .unwrap();
        let headers = store.take_set_cookie_headers();

        let refresh_header = header_for(&headers, REFRESH_TOKEN_COOKIE);
        assert!(refresh_header.starts_with("fp_refresh_token=;"));
        assert!(refresh_header.contains("Max-Age=0"));
        assert!(store.load().unwrap().unwrap().refresh_token().is_none());
    }

    #[test]
    fn clear_expires_every_credential_cookie_and_keeps_others() {
        let store = CookieJarStore::from_cookie_header("theme=dark; fp_access_token=abc", settings());
        store.clear().unwrap();

        let headers = store.take_set_cookie_headers();
        assert_eq!(headers.len(), 4);
        assert!(headers.iter().all(|h| h.contains("Max-Age=0")));
        assert!(store.load().unwrap().is_none());
        assert_eq!(store.cookie_header().as_deref(), Some("theme=dark"));
    }

    #[test]
    fn unusual_values_are_encoded_and_read_back() {
        let store = CookieJarStore::new(settings());
        let identity = Identity {
            user_id: Some(UserId::new("user 1").unwrap()),
            email: Some("a,b;\"c\"@example.com".to_string()),
        };
        store
            .store(&Credential::new("has space", None, identity, None))
            .unwrap();

        let headers = store.take_set_cookie_headers();
        assert!(header_for(&headers, ACCESS_TOKEN_COOKIE).starts_with("fp_access_token=has%20space;"));

        let reloaded = CookieJarStore::from_cookie_header(&store.cookie_header().unwrap(), settings());
        let credential = reloaded.load().unwrap().unwrap();
        assert_eq!(credential.access_token().expose_secret(), "has space");
        assert_eq!(credential.email(), Some("a,b;\"c\"@example.com"));
        assert_eq!(credential.identity().user_id.as_ref().unwrap().as_str(), "user 1");
    }
}
