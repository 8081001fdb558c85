//! MembershipCtaHandler - Command handler for the membership button.
//!
//! The button's intent is derived from the current CTA state and whether the
//! profile is free: follow, start a membership checkout, or open
//! subscription management.

use std::sync::Arc;

use url::Url;

use crate::application::error::{CheckoutAction, CheckoutError};
use crate::application::handlers::credential::usable_credential;
use crate::application::in_flight::InFlightRegistry;
use crate::application::navigation::{NavigationTarget, PendingNavigation};
use crate::domain::catalog::{Catalog, Profile};
use crate::domain::checkout::login_redirect;
use crate::domain::credential::Credential;
use crate::domain::entitlement::ResolvedEntitlements;
use crate::domain::foundation::ProfileId;
use crate::domain::membership::{CtaIntent, CtaState};
use crate::ports::{
    CheckoutService, Clock, CredentialStore, EntitlementSource, FreeMembershipRequest,
    MembershipCheckoutRequest, Navigator, ServiceError, UserPrompt,
};

#[derive(Debug, Clone)]
pub struct MembershipCtaCommand {
    pub profile_id: ProfileId,
    pub return_path: String,
    /// CTA state as currently rendered.
    pub cta: CtaState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipCtaOutcome {
    LoginRedirect { url: Url },
    /// Free membership created and entitlements re-resolved.
    Followed { resolved: ResolvedEntitlements },
    CheckoutOpened {
        session_id: Option<String>,
        target: NavigationTarget,
    },
    PortalOpened { target: NavigationTarget },
}

pub struct MembershipCtaHandler {
    catalog: Arc<Catalog>,
    entitlements: Arc<dyn EntitlementSource>,
    credentials: Arc<dyn CredentialStore>,
    checkout: Arc<dyn CheckoutService>,
    navigator: Arc<dyn Navigator>,
    prompt: Arc<dyn UserPrompt>,
    clock: Arc<dyn Clock>,
    in_flight: InFlightRegistry,
    app_url: Url,
    language: String,
}

impl MembershipCtaHandler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        catalog: Arc<Catalog>,
        entitlements: Arc<dyn EntitlementSource>,
        credentials: Arc<dyn CredentialStore>,
        checkout: Arc<dyn CheckoutService>,
        navigator: Arc<dyn Navigator>,
        prompt: Arc<dyn UserPrompt>,
        clock: Arc<dyn Clock>,
        in_flight: InFlightRegistry,
        app_url: Url,
        language: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            entitlements,
            credentials,
            checkout,
            navigator,
            prompt,
            clock,
            in_flight,
            app_url,
            language: language.into(),
        }
    }

    pub async fn handle(&self, cmd: MembershipCtaCommand) -> Result<MembershipCtaOutcome, CheckoutError> {
        let result = self.press(&cmd).await;
        if let Err(e) = &result {
            tracing::warn!(profile_id = %cmd.profile_id, cta = ?cmd.cta, error = %e, "Membership action failed");
            if let Some(alert) = e.alert() {
                self.prompt.alert(alert);
            }
        }
        result
    }

    async fn press(&self, cmd: &MembershipCtaCommand) -> Result<MembershipCtaOutcome, CheckoutError> {
        let profile = self.catalog.profile(&cmd.profile_id).ok_or_else(|| {
            CheckoutError::initiation(
                CheckoutAction::MembershipCheckout,
                ServiceError::rejected(format!("Unknown profile '{}'", cmd.profile_id)),
            )
        })?;
        let free_profile = profile.is_free();

        let Some(credential) = usable_credential(self.credentials.as_ref(), &self.clock.now()) else {
            // Paid profiles resume checkout once the viewer is back
            let url = login_redirect(&self.app_url, &cmd.return_path, !free_profile);
            self.navigator.navigate_current(&url);
            return Ok(MembershipCtaOutcome::LoginRedirect { url });
        };

        let _guard = self
            .in_flight
            .try_acquire(format!("membership:{}", profile.id))
            .ok_or_else(|| CheckoutError::InFlight(profile.id.to_string()))?;

        match cmd.cta.intent(free_profile) {
            CtaIntent::Follow => self.follow(profile, &credential).await,
            CtaIntent::Checkout => self.start_checkout(profile, &credential).await,
            CtaIntent::ManageSubscription => self.open_portal(&credential).await,
        }
    }

    async fn follow(&self, profile: &Profile, credential: &Credential) -> Result<MembershipCtaOutcome, CheckoutError> {
        self.checkout
            .create_free_membership(FreeMembershipRequest {
                profile_id: profile.id.clone(),
                access_token: credential.access_token().clone(),
            })
            .await
            .map_err(|e| CheckoutError::initiation(CheckoutAction::Follow, e))?;

        tracing::info!(profile_id = %profile.id, "Followed creator");
        let resolved = self.entitlements.resolve(Some(credential), &profile.id).await;
        Ok(MembershipCtaOutcome::Followed { resolved })
    }

    async fn start_checkout(
        &self,
        profile: &Profile,
        credential: &Credential,
    ) -> Result<MembershipCtaOutcome, CheckoutError> {
        let reservation = PendingNavigation::reserve(self.navigator.clone());
        let membership_price = profile.membership_price.unwrap_or_default();

        let redirect = self
            .checkout
            .create_membership_session(MembershipCheckoutRequest {
                profile_id: profile.id.clone(),
                membership_price,
                customer_email: credential.email().map(str::to_string),
                language: self.language.clone(),
                display_name: profile.display_name.clone(),
            })
            .await
            .map_err(|e| CheckoutError::initiation(CheckoutAction::MembershipCheckout, e))?;

        let target = reservation.commit(&redirect.url);
        tracing::info!(profile_id = %profile.id, price = %membership_price, "Membership checkout opened");
        Ok(MembershipCtaOutcome::CheckoutOpened {
            session_id: redirect.session_id,
            target,
        })
    }

    async fn open_portal(&self, credential: &Credential) -> Result<MembershipCtaOutcome, CheckoutError> {
        let email = credential.email().ok_or_else(|| {
            CheckoutError::initiation(
                CheckoutAction::ManageSubscription,
                ServiceError::rejected("Account email is required to manage a subscription"),
            )
        })?;

        let reservation = PendingNavigation::reserve(self.navigator.clone());
        let redirect = self
            .checkout
            .create_portal_session(email)
            .await
            .map_err(|e| CheckoutError::initiation(CheckoutAction::ManageSubscription, e))?;

        Ok(MembershipCtaOutcome::PortalOpened {
            target: reservation.commit(&redirect.url),
        })
    }
}
