//! Credential lookup shared by the handlers.

use crate::domain::credential::Credential;
use crate::domain::foundation::Timestamp;
use crate::ports::CredentialStore;

/// Loads the stored credential. A store that cannot be read counts as
/// signed out.
pub(crate) fn stored_credential(store: &dyn CredentialStore) -> Option<Credential> {
    match store.load() {
        Ok(credential) => credential,
        Err(e) => {
            tracing::warn!(error = %e, "Credential store unreadable, treating viewer as signed out");
            None
        }
    }
}

/// Like [`stored_credential`], but only a credential fit for a backend call.
pub(crate) fn usable_credential(store: &dyn CredentialStore, now: &Timestamp) -> Option<Credential> {
    stored_credential(store).filter(|c| c.is_usable(now))
}
