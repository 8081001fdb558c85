//! ProfilePage - one page view of a creator profile.
//!
//! Holds the current immutable entitlement state and swaps it on every
//! resolution. Actions go through the handlers; any re-resolution they
//! return is folded in with `advance`, so unlocks never regress within the
//! page view. Logging out or deleting the account starts a fresh page view.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use url::Url;

use crate::adapters::background::TokenAwardTask;
use crate::application::countdown::{CountdownEvent, PromotionCountdown};
use crate::application::error::CheckoutError;
use crate::application::handlers::{
    CheckoutReturnHandler, CheckoutReturnOutcome, DeleteAccountCommand, DeleteAccountError, DeleteAccountHandler,
    DeleteAccountResult, HandleCheckoutReturnCommand, LoadProfilePageHandler, LoadProfilePageQuery, LogoutHandler,
    LogoutResult, MembershipCtaCommand, MembershipCtaHandler, MembershipCtaOutcome, PageError, ProcessedSessions,
    PurchaseContentCommand, PurchaseContentHandler, PurchaseOutcome,
};
use crate::application::in_flight::InFlightRegistry;
use crate::domain::catalog::{Catalog, Profile};
use crate::domain::entitlement::ResolvedEntitlements;
use crate::domain::foundation::{ProfileId, VideoId};
use crate::domain::unlock::{render, PageEntitlementState, PageView};
use crate::ports::{
    CheckoutService, Clock, CredentialStore, CredentialStoreError, EntitlementSource, Navigator, UserPrompt,
    VerificationService,
};

#[derive(Debug, Error)]
pub enum ProfilePageError {
    #[error(transparent)]
    Page(#[from] PageError),

    #[error(transparent)]
    CredentialStore(#[from] CredentialStoreError),

    #[error(transparent)]
    DeleteAccount(#[from] DeleteAccountError),
}

/// Everything a page view talks to.
#[derive(Clone)]
pub struct PageServices {
    pub catalog: Arc<Catalog>,
    pub entitlements: Arc<dyn EntitlementSource>,
    pub credentials: Arc<dyn CredentialStore>,
    pub verification: Arc<dyn VerificationService>,
    pub checkout: Arc<dyn CheckoutService>,
    pub navigator: Arc<dyn Navigator>,
    pub prompt: Arc<dyn UserPrompt>,
    pub clock: Arc<dyn Clock>,
    pub app_url: Url,
    pub language: String,
    pub award_pending_tokens: bool,
}

pub struct ProfilePage {
    profile: Profile,
    page_url: Url,
    clock: Arc<dyn Clock>,
    loader: LoadProfilePageHandler,
    purchase: PurchaseContentHandler,
    membership: MembershipCtaHandler,
    logout: LogoutHandler,
    delete_account: DeleteAccountHandler,
    state: PageEntitlementState,
    checkout_return: Option<Result<CheckoutReturnOutcome, CheckoutError>>,
    countdown: PromotionCountdown,
    countdown_events: Option<mpsc::UnboundedReceiver<CountdownEvent>>,
}

impl ProfilePage {
    /// Loads the page at `page_url`, handling a checkout return if the URL
    /// carries one.
    pub async fn open(services: PageServices, profile_id: ProfileId, page_url: Url) -> Result<Self, ProfilePageError> {
        let s = services;
        let in_flight = InFlightRegistry::new();

        let mut loader = LoadProfilePageHandler::new(
            s.catalog.clone(),
            s.entitlements.clone(),
            s.credentials.clone(),
            s.clock.clone(),
        );
        if s.award_pending_tokens {
            loader = loader.with_token_award(TokenAwardTask::new(s.verification.clone()));
        }
        let purchase = PurchaseContentHandler::new(
            s.catalog.clone(),
            s.entitlements.clone(),
            s.credentials.clone(),
            s.checkout.clone(),
            s.navigator.clone(),
            s.prompt.clone(),
            s.clock.clone(),
            in_flight.clone(),
            s.app_url.clone(),
            s.language.clone(),
        );
        let membership = MembershipCtaHandler::new(
            s.catalog.clone(),
            s.entitlements.clone(),
            s.credentials.clone(),
            s.checkout.clone(),
            s.navigator.clone(),
            s.prompt.clone(),
            s.clock.clone(),
            in_flight,
            s.app_url.clone(),
            s.language.clone(),
        );
        let returns = CheckoutReturnHandler::new(
            s.verification.clone(),
            s.credentials.clone(),
            s.entitlements.clone(),
            s.navigator.clone(),
            s.prompt.clone(),
            ProcessedSessions::new(),
        );
        let logout = LogoutHandler::new(s.verification.clone(), s.credentials.clone());
        let delete_account = DeleteAccountHandler::new(
            s.verification.clone(),
            s.credentials.clone(),
            s.navigator.clone(),
            s.prompt.clone(),
            s.app_url.clone(),
        );

        let profile = loader.profile(&profile_id)?.clone();
        let loaded = loader
            .handle(LoadProfilePageQuery {
                profile_id: profile_id.clone(),
            })
            .await?;

        let mut page = Self {
            profile,
            page_url: page_url.clone(),
            clock: s.clock,
            loader,
            purchase,
            membership,
            logout,
            delete_account,
            state: loaded.state,
            checkout_return: None,
            countdown: PromotionCountdown::new(),
            countdown_events: None,
        };

        let returned = returns
            .handle(HandleCheckoutReturnCommand {
                profile_id,
                current_url: page_url,
            })
            .await;
        match &returned {
            Ok(CheckoutReturnOutcome::Verified { resolved, .. })
            | Ok(CheckoutReturnOutcome::AlreadyProcessed { resolved }) => page.apply(resolved.clone()),
            _ => page.restart_countdown(),
        }
        page.checkout_return = Some(returned);
        Ok(page)
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn state(&self) -> &PageEntitlementState {
        &self.state
    }

    /// Result of the checkout return handled on open, if any was attempted.
    pub fn checkout_return(&self) -> Option<&Result<CheckoutReturnOutcome, CheckoutError>> {
        self.checkout_return.as_ref()
    }

    /// Renders the page as of now.
    pub fn view(&self) -> PageView {
        render(&self.profile, &self.state.at(self.clock.now()))
    }

    /// Re-resolves within this page view.
    pub async fn refresh(&mut self) -> Result<PageView, ProfilePageError> {
        self.state = self.loader.refresh(&self.state).await?;
        self.restart_countdown();
        Ok(self.view())
    }

    pub async fn purchase(&mut self, video_id: VideoId) -> Result<PurchaseOutcome, CheckoutError> {
        let outcome = self
            .purchase
            .handle(PurchaseContentCommand {
                profile_id: self.profile.id.clone(),
                video_id,
                return_path: self.return_path(),
                known_token_count: self.state.snapshot().token_count(),
            })
            .await?;
        if let PurchaseOutcome::TokenUnlocked { resolved } = &outcome {
            self.apply(resolved.clone());
        }
        Ok(outcome)
    }

    pub async fn press_membership(&mut self) -> Result<MembershipCtaOutcome, CheckoutError> {
        let outcome = self
            .membership
            .handle(MembershipCtaCommand {
                profile_id: self.profile.id.clone(),
                return_path: self.return_path(),
                cta: self.state.cta(),
            })
            .await?;
        if let MembershipCtaOutcome::Followed { resolved } = &outcome {
            self.apply(resolved.clone());
        }
        Ok(outcome)
    }

    /// Logs out and starts a fresh, anonymous page view.
    pub async fn logout(&mut self) -> Result<LogoutResult, ProfilePageError> {
        let result = self.logout.handle().await?;
        let loaded = self
            .loader
            .handle(LoadProfilePageQuery {
                profile_id: self.profile.id.clone(),
            })
            .await?;
        self.state = loaded.state;
        self.restart_countdown();
        Ok(result)
    }

    /// Deletes the account once `confirmation_email` matches it, then starts
    /// a fresh, anonymous page view.
    pub async fn delete_account(&mut self, confirmation_email: &str) -> Result<DeleteAccountResult, ProfilePageError> {
        let result = self
            .delete_account
            .handle(DeleteAccountCommand {
                confirmation_email: confirmation_email.to_string(),
            })
            .await?;
        let loaded = self
            .loader
            .handle(LoadProfilePageQuery {
                profile_id: self.profile.id.clone(),
            })
            .await?;
        self.state = loaded.state;
        self.restart_countdown();
        Ok(result)
    }

    /// Waits for the next countdown event. Expiry re-resolves the page
    /// before returning. `None` when no promotion is running.
    pub async fn next_countdown_event(&mut self) -> Option<CountdownEvent> {
        let event = self.countdown_events.as_mut()?.recv().await;
        match event {
            Some(CountdownEvent::Expired) => {
                self.countdown_events = None;
                if let Err(e) = self.refresh().await {
                    tracing::warn!(error = %e, "Refresh after promotion expiry failed");
                }
                Some(CountdownEvent::Expired)
            }
            Some(tick) => Some(tick),
            None => {
                self.countdown_events = None;
                None
            }
        }
    }

    pub fn countdown_running(&self) -> bool {
        self.countdown.is_running()
    }

    fn apply(&mut self, resolved: ResolvedEntitlements) {
        self.state = self.state.advance(&self.profile, resolved, self.clock.now());
        self.restart_countdown();
    }

    fn restart_countdown(&mut self) {
        let offer = *self.state.at(self.clock.now()).promotion();
        if offer.applies() {
            self.countdown_events = Some(self.countdown.start(offer.window.remaining_seconds));
        } else {
            self.countdown.stop();
            self.countdown_events = None;
        }
    }

    fn return_path(&self) -> String {
        self.page_url.path().to_string()
    }
}
