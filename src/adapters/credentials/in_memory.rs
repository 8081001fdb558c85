//! In-memory credential store.
//!
//! Holds at most one credential for the life of the process. Used by the
//! binary and by tests.

use std::sync::{Arc, RwLock};

use crate::domain::credential::Credential;
use crate::ports::{CredentialStore, CredentialStoreError};

#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    slot: Arc<RwLock<Option<Credential>>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `credential`.
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Some(credential))),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slot.read().map(|slot| slot.is_none()).unwrap_or(true)
    }
}

fn poisoned<T>(_: T) -> CredentialStoreError {
    CredentialStoreError::Unavailable("credential lock poisoned".to_string())
}

impl CredentialStore for InMemoryCredentialStore {
    fn load(&self) -> Result<Option<Credential>, CredentialStoreError> {
        Ok(self.slot.read().map_err(poisoned)?.clone())
    }

    fn store(&self, credential: &Credential) -> Result<(), CredentialStoreError> {
        *self.slot.write().map_err(poisoned)? = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialStoreError> {
        *self.slot.write().map_err(poisoned)? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::credential::Identity;
    use secrecy::ExposeSecret;

    #[test]
    fn store_then_load_returns_the_credential() {
        let store = InMemoryCredentialStore::new();
        assert!(store.load().unwrap().is_none());

        store
            .store(&Credential::new("access", None, Identity::default(), None))
            .unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.access_token().expose_secret(), "access");
    }

    #[test]
    fn clones_share_the_slot() {
        let store = InMemoryCredentialStore::new();
        let other = store.clone();
        store
            .store(&Credential::new("access", None, Identity::default(), None))
            .unwrap();
        assert!(!other.is_empty());
    }

    #[test]
    fn clearing_an_empty_store_succeeds() {
        let store = InMemoryCredentialStore::new();
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.is_empty());
    }
}
