//! Authentication adapters.
//!
//! - `token_claims` - Unverified JWT payload reading for the client side

mod token_claims;

pub use token_claims::{
    credential_from_tokens, decode_claims, encode_claims, ClaimsError, TokenClaims,
};
