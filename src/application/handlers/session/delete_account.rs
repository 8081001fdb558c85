//! DeleteAccountHandler - Permanently deletes the signed-in viewer's account.
//!
//! The viewer must retype their account email. The local credential is
//! cleared only after the backend confirms; a failed deletion leaves the
//! session untouched.

use std::sync::Arc;

use thiserror::Error;
use url::Url;

use crate::application::handlers::credential::stored_credential;
use crate::ports::{CredentialStore, Navigator, ServiceError, UserAlert, UserPrompt, VerificationService};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeleteAccountError {
    #[error("Sign-in required")]
    NotSignedIn,

    /// The typed email does not match the account.
    #[error("Confirmation does not match the account email")]
    ConfirmationMismatch,

    #[error("Account deletion failed: {0}")]
    Backend(#[source] ServiceError),
}

impl DeleteAccountError {
    /// Alert to show, or `None` when the dialog itself explains the problem.
    pub fn alert(&self) -> Option<UserAlert> {
        match self {
            DeleteAccountError::Backend(_) => Some(UserAlert::error(
                "Failed to delete your account. Please try again.",
            )),
            _ => None,
        }
    }
}

/// Command carrying what the viewer typed into the confirmation field.
#[derive(Debug, Clone)]
pub struct DeleteAccountCommand {
    pub confirmation_email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteAccountResult {
    /// False when the account is gone but the local credential could not be cleared.
    pub session_cleared: bool,
}

pub struct DeleteAccountHandler {
    verification: Arc<dyn VerificationService>,
    credentials: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    prompt: Arc<dyn UserPrompt>,
    home_url: Url,
}

impl DeleteAccountHandler {
    pub fn new(
        verification: Arc<dyn VerificationService>,
        credentials: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
        prompt: Arc<dyn UserPrompt>,
        home_url: Url,
    ) -> Self {
        Self {
            verification,
            credentials,
            navigator,
            prompt,
            home_url,
        }
    }

    pub async fn handle(&self, cmd: DeleteAccountCommand) -> Result<DeleteAccountResult, DeleteAccountError> {
        let result = self.process(cmd).await;
        if let Err(e) = &result {
            if let Some(alert) = e.alert() {
                self.prompt.alert(alert);
            }
        }
        result
    }

    async fn process(&self, cmd: DeleteAccountCommand) -> Result<DeleteAccountResult, DeleteAccountError> {
        // 1. Need a signed-in account with a known id
        let credential = stored_credential(self.credentials.as_ref()).ok_or(DeleteAccountError::NotSignedIn)?;
        let user_id = credential
            .identity()
            .user_id
            .clone()
            .ok_or(DeleteAccountError::NotSignedIn)?;

        // 2. Typed email must match exactly
        let confirmed = credential
            .email()
            .map_or(false, |email| email == cmd.confirmation_email.trim());
        if !confirmed {
            return Err(DeleteAccountError::ConfirmationMismatch);
        }

        // 3. Backend deletes; the session survives a failure
        self.verification
            .delete_account(&user_id)
            .await
            .map_err(DeleteAccountError::Backend)?;

        // 4. Drop the now-dead credential and leave the page
        let session_cleared = match self.credentials.clear() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Deleted account's credential could not be cleared");
                false
            }
        };
        tracing::info!(user_id = %user_id, session_cleared, "Account deleted");
        self.prompt.alert(UserAlert::info("Your account has been deleted."));
        self.navigator.navigate_current(&self.home_url);

        Ok(DeleteAccountResult { session_cleared })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::credentials::InMemoryCredentialStore;
    use crate::application::handlers::test_support::{Harness, FAN, PAGE};
    use crate::domain::credential::Credential;
    use crate::ports::{AlertSeverity, CredentialStoreError};

    fn handler(h: &Harness) -> DeleteAccountHandler {
        DeleteAccountHandler::new(
            h.storefront.clone(),
            Arc::new(h.credentials.clone()),
            Arc::new(h.navigator.clone()),
            Arc::new(h.prompt.clone()),
            h.app_url.clone(),
        )
    }

    fn confirm(email: &str) -> DeleteAccountCommand {
        DeleteAccountCommand {
            confirmation_email: email.to_string(),
        }
    }

    #[tokio::test]
    async fn confirmed_deletion_clears_session_and_goes_home() {
        let h = Harness::new().signed_in();

        let result = handler(&h).handle(confirm(&format!("  {} ", FAN))).await.unwrap();

        assert!(result.session_cleared);
        assert!(h.credentials.is_empty());
        assert!(h.storefront.account(FAN).is_none());
        assert_eq!(h.navigator.current_url(), Some(h.app_url.clone()));
        assert_eq!(h.prompt.last_alert().unwrap().severity, AlertSeverity::Info);
    }

    #[tokio::test]
    async fn backend_failure_keeps_the_session_and_alerts() {
        let h = Harness::new().signed_in();
        h.storefront
            .set_method_error("delete_account", ServiceError::server("database unavailable"));

        let err = handler(&h).handle(confirm(FAN)).await.unwrap_err();

        assert!(matches!(err, DeleteAccountError::Backend(_)));
        assert!(!h.credentials.is_empty());
        assert!(h.storefront.account(FAN).is_some());
        assert_eq!(h.prompt.last_alert().unwrap().severity, AlertSeverity::Error);
        assert_eq!(h.navigator.current_url(), Some(Url::parse(PAGE).unwrap()));
    }

    #[tokio::test]
    async fn mismatched_confirmation_never_reaches_the_backend() {
        let h = Harness::new().signed_in();

        let err = handler(&h).handle(confirm("Fan@Example.com")).await.unwrap_err();

        assert_eq!(err, DeleteAccountError::ConfirmationMismatch);
        assert!(!h.storefront.was_called("delete_account"));
        assert!(!h.credentials.is_empty());
        assert!(h.prompt.alerts().is_empty());
    }

    #[tokio::test]
    async fn signed_out_viewer_cannot_delete() {
        let h = Harness::new();

        let err = handler(&h).handle(confirm(FAN)).await.unwrap_err();

        assert_eq!(err, DeleteAccountError::NotSignedIn);
        assert!(!h.storefront.was_called("delete_account"));
    }

    struct StuckStore(InMemoryCredentialStore);

    impl CredentialStore for StuckStore {
        fn load(&self) -> Result<Option<Credential>, CredentialStoreError> {
            self.0.load()
        }

        fn store(&self, credential: &Credential) -> Result<(), CredentialStoreError> {
            self.0.store(credential)
        }

        fn clear(&self) -> Result<(), CredentialStoreError> {
            Err(CredentialStoreError::Unavailable("read-only".into()))
        }
    }

    #[tokio::test]
    async fn deletion_still_succeeds_when_the_session_cannot_be_cleared() {
        let h = Harness::new().signed_in();
        let handler = DeleteAccountHandler::new(
            h.storefront.clone(),
            Arc::new(StuckStore(h.credentials.clone())),
            Arc::new(h.navigator.clone()),
            Arc::new(h.prompt.clone()),
            h.app_url.clone(),
        );

        let result = handler.handle(confirm(FAN)).await.unwrap();

        assert!(!result.session_cleared);
        assert!(h.storefront.account(FAN).is_none());
    }
}
