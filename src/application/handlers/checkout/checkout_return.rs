//! CheckoutReturnHandler - Handles the viewer landing back from checkout.
//!
//! ## How It Works
//!
//! 1. Parse return indicators from the current URL; none means nothing to do
//! 2. Strip the indicators so a reload never re-runs the return
//! 3. Canceled: leave entitlements untouched
//! 4. Success: skip sessions already processed in this page session
//! 5. Verify the session with the backend, store the credential it returns
//! 6. Mark the session processed (only after success) and re-resolve
//!
//! A return URL alone never unlocks anything; only the backend's answer to
//! the verify call does.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use url::Url;

use crate::application::error::CheckoutError;
use crate::application::handlers::credential::stored_credential;
use crate::domain::checkout::{strip_indicators, CheckoutKind, CheckoutReturn, ReturnOutcome};
use crate::domain::entitlement::ResolvedEntitlements;
use crate::domain::foundation::{ProfileId, VideoId};
use crate::ports::{CredentialStore, EntitlementSource, Navigator, UserPrompt, VerificationService, VerifySessionRequest};

/// Checkout sessions already verified during this page session.
#[derive(Debug, Clone, Default)]
pub struct ProcessedSessions {
    ids: Arc<Mutex<HashSet<String>>>,
}

impl ProcessedSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.lock().contains(session_id)
    }

    pub fn mark_processed(&self, session_id: &str) {
        self.lock().insert(session_id.to_string());
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.ids.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Debug, Clone)]
pub struct HandleCheckoutReturnCommand {
    pub profile_id: ProfileId,
    pub current_url: Url,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutReturnOutcome {
    /// The URL carried no return indicators.
    NoReturn,
    /// The viewer backed out; entitlements are unchanged.
    Canceled { kind: CheckoutKind },
    /// Payment confirmed by the backend.
    Verified {
        kind: CheckoutKind,
        video_id: Option<VideoId>,
        resolved: ResolvedEntitlements,
    },
    /// Session already verified earlier; only re-resolved.
    AlreadyProcessed { resolved: ResolvedEntitlements },
}

pub struct CheckoutReturnHandler {
    verification: Arc<dyn VerificationService>,
    credentials: Arc<dyn CredentialStore>,
    entitlements: Arc<dyn EntitlementSource>,
    navigator: Arc<dyn Navigator>,
    prompt: Arc<dyn UserPrompt>,
    processed: ProcessedSessions,
}

impl CheckoutReturnHandler {
    pub fn new(
        verification: Arc<dyn VerificationService>,
        credentials: Arc<dyn CredentialStore>,
        entitlements: Arc<dyn EntitlementSource>,
        navigator: Arc<dyn Navigator>,
        prompt: Arc<dyn UserPrompt>,
        processed: ProcessedSessions,
    ) -> Self {
        Self {
            verification,
            credentials,
            entitlements,
            navigator,
            prompt,
            processed,
        }
    }

    pub async fn handle(&self, cmd: HandleCheckoutReturnCommand) -> Result<CheckoutReturnOutcome, CheckoutError> {
        // 1. Anything to handle?
        let Some(ret) = CheckoutReturn::parse(&cmd.current_url) else {
            return Ok(CheckoutReturnOutcome::NoReturn);
        };

        // 2. Consume the indicators whatever happens next
        self.navigator.replace_location(&strip_indicators(&cmd.current_url));

        let result = self.process(&cmd.profile_id, ret).await;
        if let Err(e) = &result {
            tracing::error!(profile_id = %cmd.profile_id, error = %e, "Checkout return could not be confirmed");
            if let Some(alert) = e.alert() {
                self.prompt.alert(alert);
            }
        }
        result
    }

    async fn process(&self, profile_id: &ProfileId, ret: CheckoutReturn) -> Result<CheckoutReturnOutcome, CheckoutError> {
        let session_id = match ret.outcome {
            // 3. Canceled
            ReturnOutcome::Canceled => {
                tracing::info!(kind = ?ret.kind, "Checkout canceled");
                return Ok(CheckoutReturnOutcome::Canceled { kind: ret.kind });
            }
            ReturnOutcome::Unverifiable => return Err(CheckoutError::MissingSession { kind: ret.kind }),
            ReturnOutcome::Success { session_id } => session_id,
        };

        // 4. Replays only refresh
        if self.processed.contains(&session_id) {
            tracing::debug!(session_id = %session_id, "Checkout session already processed");
            let credential = stored_credential(self.credentials.as_ref());
            let resolved = self.entitlements.resolve(credential.as_ref(), profile_id).await;
            return Ok(CheckoutReturnOutcome::AlreadyProcessed { resolved });
        }

        // 5. Backend confirmation
        let credential = self
            .verification
            .verify_checkout_session(VerifySessionRequest {
                session_id: session_id.clone(),
                profile_id: profile_id.clone(),
            })
            .await
            .map_err(|source| CheckoutError::PostPaymentVerification { kind: ret.kind, source })?;
        // Payment is confirmed; a store failure only costs the persisted session
        if let Err(e) = self.credentials.store(&credential) {
            tracing::warn!(session_id = %session_id, error = %e, "Verified credential could not be stored");
        }

        // 6. Mark processed (only after success)
        self.processed.mark_processed(&session_id);
        tracing::info!(session_id = %session_id, kind = ?ret.kind, "Checkout session verified");

        let resolved = self.entitlements.resolve(Some(&credential), profile_id).await;
        Ok(CheckoutReturnOutcome::Verified {
            kind: ret.kind,
            video_id: ret.video_id,
            resolved,
        })
    }
}
