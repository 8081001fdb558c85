//! Entitlement source backed by the verification service.
//!
//! Fails closed: anything short of a successful verification resolves to
//! the all-locked snapshot. With a credential store attached, an expired or
//! rejected access token is traded for a new one once per resolution and
//! the new credential is written back.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::credential::Credential;
use crate::domain::entitlement::ResolvedEntitlements;
use crate::domain::foundation::ProfileId;
use crate::ports::{Clock, CredentialStore, EntitlementSource, ServiceError, VerificationService};

pub struct LiveEntitlementSource {
    verification: Arc<dyn VerificationService>,
    clock: Arc<dyn Clock>,
    refresh_store: Option<Arc<dyn CredentialStore>>,
}

impl LiveEntitlementSource {
    pub fn new(verification: Arc<dyn VerificationService>, clock: Arc<dyn Clock>) -> Self {
        Self {
            verification,
            clock,
            refresh_store: None,
        }
    }

    /// Refreshes stale access tokens and persists the result in `store`.
    pub fn with_token_refresh(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.refresh_store = Some(store);
        self
    }

    async fn check(&self, credential: &Credential, profile_id: &ProfileId) -> Result<ResolvedEntitlements, ServiceError> {
        let account = self.verification.verify_token(credential.access_token()).await?;
        let resolved = ResolvedEntitlements::verified(&account, profile_id);
        tracing::debug!(
            profile_id = %profile_id,
            has_membership = resolved.snapshot.has_membership,
            purchased = resolved.snapshot.purchased_video_ids.len(),
            tokens = resolved.snapshot.token_count(),
            "Entitlements verified"
        );
        Ok(resolved)
    }

    /// Trades the refresh token for a new credential. `None` when there is
    /// nothing to refresh with or the backend declined.
    async fn refreshed(&self, credential: &Credential, profile_id: &ProfileId) -> Option<Credential> {
        let store = self.refresh_store.as_ref()?;
        let refresh_token = credential.refresh_token()?;

        match self.verification.refresh_access_token(refresh_token).await {
            Ok(fresh) => {
                if let Err(e) = store.store(&fresh) {
                    tracing::warn!(error = %e, "Refreshed credential could not be stored");
                }
                tracing::info!(profile_id = %profile_id, "Access token refreshed");
                Some(fresh)
            }
            Err(e) if e.is_auth_failure() => {
                tracing::info!(profile_id = %profile_id, reason = %e.message, "Refresh token rejected, clearing session");
                if let Err(e) = store.clear() {
                    tracing::warn!(error = %e, "Rejected credential could not be cleared");
                }
                None
            }
            Err(e) => {
                tracing::warn!(profile_id = %profile_id, code = %e.code, error = %e.message, "Token refresh failed");
                None
            }
        }
    }
}

fn failed(profile_id: &ProfileId, e: ServiceError) -> ResolvedEntitlements {
    if e.is_auth_failure() {
        tracing::info!(profile_id = %profile_id, reason = %e.message, "Credential rejected");
        return ResolvedEntitlements::rejected();
    }
    tracing::warn!(
        profile_id = %profile_id,
        code = %e.code,
        error = %e.message,
        "Entitlement verification unavailable, failing closed"
    );
    ResolvedEntitlements::unavailable()
}

#[async_trait]
impl EntitlementSource for LiveEntitlementSource {
    async fn resolve(&self, credential: Option<&Credential>, profile_id: &ProfileId) -> ResolvedEntitlements {
        let Some(credential) = credential else {
            return ResolvedEntitlements::anonymous();
        };

        let outcome = if credential.is_usable(&self.clock.now()) {
            match self.check(credential, profile_id).await {
                Err(e) if e.is_auth_failure() => match self.refreshed(credential, profile_id).await {
                    Some(fresh) => self.check(&fresh, profile_id).await,
                    None => Err(e),
                },
                other => other,
            }
        } else {
            match self.refreshed(credential, profile_id).await {
                Some(fresh) => self.check(&fresh, profile_id).await,
                None => {
                    tracing::debug!(profile_id = %profile_id, "Credential expired, resolving as anonymous");
                    return ResolvedEntitlements::anonymous();
                }
            }
        };

        outcome.unwrap_or_else(|e| failed(profile_id, e))
    }

    fn name(&self) -> &'static str {
        "live"
    }
}
