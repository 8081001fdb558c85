//! Credential store adapters.
//!
//! - `CookieJarStore` - Cookie-backed, renders `Set-Cookie` headers
//! - `InMemoryCredentialStore` - Process-local, for the binary and tests

mod cookie_jar;
mod in_memory;

pub use cookie_jar::{
    parse_cookie_header, CookieJarStore, CookieSettings, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE,
    USER_EMAIL_COOKIE, USER_ID_COOKIE,
};
pub use in_memory::InMemoryCredentialStore;
