//! LoadProfilePageHandler - Query handler resolving a profile page view.

use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;

use crate::adapters::background::TokenAwardTask;
use crate::application::handlers::credential::stored_credential;
use crate::domain::catalog::{Catalog, Profile};
use crate::domain::foundation::ProfileId;
use crate::domain::unlock::{render, PageEntitlementState, PageView};
use crate::ports::{Clock, CredentialStore, EntitlementSource};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("Profile '{0}' not found")]
    ProfileNotFound(ProfileId),
}

/// Query to load a profile page.
#[derive(Debug, Clone)]
pub struct LoadProfilePageQuery {
    pub profile_id: ProfileId,
}

/// A resolved page plus the award task it kicked off, if any.
#[derive(Debug)]
pub struct LoadProfilePageResult {
    pub state: PageEntitlementState,
    pub view: PageView,
    pub award: Option<JoinHandle<Option<u32>>>,
}

/// Handler for loading and refreshing a profile page.
///
/// Loading starts the opportunistic token award in the background and never
/// waits on it. Resolution failures never surface as errors here; they end
/// up in the state's resolution status.
pub struct LoadProfilePageHandler {
    catalog: Arc<Catalog>,
    entitlements: Arc<dyn EntitlementSource>,
    credentials: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    token_award: Option<TokenAwardTask>,
}

impl LoadProfilePageHandler {
    pub fn new(
        catalog: Arc<Catalog>,
        entitlements: Arc<dyn EntitlementSource>,
        credentials: Arc<dyn CredentialStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            catalog,
            entitlements,
            credentials,
            clock,
            token_award: None,
        }
    }

    /// Fires a token award on every load.
    pub fn with_token_award(mut self, task: TokenAwardTask) -> Self {
        self.token_award = Some(task);
        self
    }

    pub fn profile(&self, profile_id: &ProfileId) -> Result<&Profile, PageError> {
        self.catalog
            .profile(profile_id)
            .ok_or_else(|| PageError::ProfileNotFound(profile_id.clone()))
    }

    /// Starts a new page view.
    pub async fn handle(&self, query: LoadProfilePageQuery) -> Result<LoadProfilePageResult, PageError> {
        // 1. Profile must exist
        let profile = self.profile(&query.profile_id)?;

        // 2. Opportunistic award, detached from resolution
        let award = self.token_award.as_ref().map(TokenAwardTask::spawn);

        // 3. Resolve against the stored credential
        let credential = stored_credential(self.credentials.as_ref());
        let resolved = self.entitlements.resolve(credential.as_ref(), &profile.id).await;

        // 4. Build and render the immutable state
        let state = PageEntitlementState::initial(profile, resolved, self.clock.now());
        tracing::info!(
            profile_id = %profile.id,
            source = self.entitlements.name(),
            status = ?state.status(),
            cta = ?state.cta(),
            "Profile page resolved"
        );
        let view = render(profile, &state);

        Ok(LoadProfilePageResult { state, view, award })
    }

    /// Re-resolves within the same page view. Unlocks never regress, and a
    /// failed resolution keeps the previous snapshot.
    pub async fn refresh(&self, previous: &PageEntitlementState) -> Result<PageEntitlementState, PageError> {
        let profile = self.profile(previous.profile_id())?;
        let credential = stored_credential(self.credentials.as_ref());
        let resolved = self.entitlements.resolve(credential.as_ref(), &profile.id).await;

        let state = previous.advance(profile, resolved, self.clock.now());
        if state.refresh_failed() {
            tracing::warn!(profile_id = %profile.id, "Refresh failed, keeping previous entitlements");
        }
        Ok(state)
    }
}
