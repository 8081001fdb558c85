//! Credential store port - where the browser session keeps its tokens.

use thiserror::Error;

use crate::domain::credential::Credential;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialStoreError {
    #[error("Stored credential is malformed: {0}")]
    Malformed(String),

    #[error("Credential storage is unavailable: {0}")]
    Unavailable(String),
}

/// Synchronous by design of the medium (cookies, memory).
pub trait CredentialStore: Send + Sync {
    /// Loads the stored credential, if any.
    fn load(&self) -> Result<Option<Credential>, CredentialStoreError>;

    /// Replaces the stored credential.
    fn store(&self, credential: &Credential) -> Result<(), CredentialStoreError>;

    /// Removes the stored credential. Clearing an empty store succeeds.
    fn clear(&self) -> Result<(), CredentialStoreError>;
}
