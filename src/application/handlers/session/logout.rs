//! LogoutHandler - Ends the viewer's session.
//!
//! Backend revocation is best effort; the local credential is always cleared.

use std::sync::Arc;

use secrecy::SecretString;

use crate::application::handlers::credential::stored_credential;
use crate::ports::{CredentialStore, CredentialStoreError, VerificationService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoutResult {
    /// False when the backend could not be told.
    pub revoked: bool,
}

pub struct LogoutHandler {
    verification: Arc<dyn VerificationService>,
    credentials: Arc<dyn CredentialStore>,
}

impl LogoutHandler {
    pub fn new(verification: Arc<dyn VerificationService>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            verification,
            credentials,
        }
    }

    pub async fn handle(&self) -> Result<LogoutResult, CredentialStoreError> {
        let refresh_token: Option<SecretString> =
            stored_credential(self.credentials.as_ref()).and_then(|c| c.refresh_token().cloned());

        let revoked = match refresh_token {
            Some(token) => match self.verification.logout(&token).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(error = %e, "Backend logout failed, clearing local session anyway");
                    false
                }
            },
            None => false,
        };

        self.credentials.clear()?;
        tracing::info!(revoked, "Logged out");
        Ok(LogoutResult { revoked })
    }
}
