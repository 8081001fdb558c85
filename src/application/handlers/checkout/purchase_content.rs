//! PurchaseContentHandler - Command handler for buying a single item.
//!
//! Re-resolves entitlements before pricing so the quote always reflects the
//! backend's current token balance, then either spends two tokens for a free
//! unlock or opens an external checkout at the quoted amount.

use std::sync::Arc;

use url::Url;

use crate::application::error::{CheckoutAction, CheckoutError};
use crate::application::handlers::credential::usable_credential;
use crate::application::in_flight::InFlightRegistry;
use crate::application::navigation::{NavigationTarget, PendingNavigation};
use crate::domain::catalog::Catalog;
use crate::domain::checkout::login_redirect;
use crate::domain::credential::Credential;
use crate::domain::entitlement::{ResolutionStatus, ResolvedEntitlements, FREE_UNLOCK_TOKEN_COST};
use crate::domain::foundation::{ProfileId, VideoId};
use crate::domain::pricing::{quote, PriceQuote};
use crate::domain::unlock::PageEntitlementState;
use crate::ports::{
    CheckoutService, Clock, ContentCheckoutRequest, CredentialStore, EntitlementSource, Navigator,
    ServiceError, TokenUnlockRequest, UserAlert, UserPrompt,
};

/// Command to buy one item.
#[derive(Debug, Clone)]
pub struct PurchaseContentCommand {
    pub profile_id: ProfileId,
    pub video_id: VideoId,
    /// Path the login page should send the viewer back to.
    pub return_path: String,
    /// Balance currently shown on the page; picks whether a tab is reserved.
    pub known_token_count: u32,
}

/// How a purchase attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseOutcome {
    /// Not signed in; the current tab went to login.
    LoginRedirect { url: Url },
    /// The viewer already owns the item; nothing was charged.
    AlreadyOwned,
    /// The viewer declined the token confirmation.
    Declined,
    /// Tokens were spent and entitlements re-resolved.
    TokenUnlocked { resolved: ResolvedEntitlements },
    /// External checkout opened at the quoted price.
    CheckoutOpened {
        quote: PriceQuote,
        session_id: Option<String>,
        target: NavigationTarget,
    },
}

pub struct PurchaseContentHandler {
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

impl PurchaseContentHandler {
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

    /// Runs the purchase and alerts the viewer on failure.
    pub async fn handle(&self, cmd: PurchaseContentCommand) -> Result<PurchaseOutcome, CheckoutError> {
        let result = self.purchase(&cmd).await;
        if let Err(e) = &result {
            tracing::warn!(
                profile_id = %cmd.profile_id,
                video_id = %cmd.video_id,
                error = %e,
                "Content purchase failed"
            );
            if let Some(alert) = e.alert() {
                self.prompt.alert(alert);
            }
        }
        result
    }

    async fn purchase(&self, cmd: &PurchaseContentCommand) -> Result<PurchaseOutcome, CheckoutError> {
        // 1. Item must be on the profile
        let profile = self
            .catalog
            .profile(&cmd.profile_id)
            .ok_or_else(|| CheckoutError::UnknownItem(cmd.video_id.clone()))?;
        let item = profile
            .find_item(&cmd.video_id)
            .ok_or_else(|| CheckoutError::UnknownItem(cmd.video_id.clone()))?;

        // 2. Signed out: send the viewer to login
        let Some(credential) = usable_credential(self.credentials.as_ref(), &self.clock.now()) else {
            return Ok(self.redirect_to_login(&cmd.return_path));
        };

        // 3. One request per item at a time
        let _guard = self
            .in_flight
            .try_acquire(format!("content:{}:{}", cmd.profile_id, cmd.video_id))
            .ok_or_else(|| CheckoutError::InFlight(cmd.video_id.to_string()))?;

        // 4. Reserve the tab while still inside the click
        let reservation = (cmd.known_token_count < FREE_UNLOCK_TOKEN_COST)
            .then(|| PendingNavigation::reserve(self.navigator.clone()));

        // 5. Fresh entitlements; never price from the cached page
        let resolved = self.entitlements.resolve(Some(&credential), &profile.id).await;
        match resolved.status {
            ResolutionStatus::Rejected | ResolutionStatus::Anonymous => {
                drop(reservation);
                return Ok(self.redirect_to_login(&cmd.return_path));
            }
            ResolutionStatus::Unavailable => {
                return Err(CheckoutError::initiation(
                    CheckoutAction::ContentCheckout,
                    ServiceError::network("Entitlements could not be verified"),
                ));
            }
            ResolutionStatus::Verified | ResolutionStatus::Simulated => {}
        }
        let fresh = PageEntitlementState::initial(profile, resolved, self.clock.now());
        if fresh.snapshot().owns(&item.id) {
            tracing::info!(video_id = %item.id, "Item already owned, skipping checkout");
            return Ok(PurchaseOutcome::AlreadyOwned);
        }

        // 6. Price it
        let token_count = fresh.snapshot().token_count();
        let price = quote(item, token_count, fresh.promotion())?;

        if price.free_unlock {
            drop(reservation);
            return self.unlock_with_tokens(cmd, &credential, token_count, price).await;
        }

        // 7. Paid path: create the session, then commit the reserved tab
        let reservation = reservation.unwrap_or_else(|| PendingNavigation::reserve(self.navigator.clone()));
        let request = ContentCheckoutRequest {
            profile_id: profile.id.clone(),
            video_id: item.id.clone(),
            amount_due: price.amount_due,
            tokens_to_use: price.tokens_to_consume,
            customer_email: credential.email().map(str::to_string),
            language: self.language.clone(),
            video_title: item.title.clone(),
            creator_display_name: profile.display_name.clone(),
        };
        let redirect = self
            .checkout
            .create_content_session(request)
            .await
            .map_err(|e| CheckoutError::initiation(CheckoutAction::ContentCheckout, e))?;

        let target = reservation.commit(&redirect.url);
        tracing::info!(
            video_id = %item.id,
            amount_due = %price.amount_due,
            rule = ?price.rule,
            tokens_to_use = price.tokens_to_consume,
            "Content checkout opened"
        );
        Ok(PurchaseOutcome::CheckoutOpened {
            quote: price,
            session_id: redirect.session_id,
            target,
        })
    }

    async fn unlock_with_tokens(
        &self,
        cmd: &PurchaseContentCommand,
        credential: &Credential,
        token_count: u32,
        price: PriceQuote,
    ) -> Result<PurchaseOutcome, CheckoutError> {
        let question = format!(
            "Use {} tokens to unlock this content for FREE?\n\nYou have {} tokens.",
            price.tokens_to_consume, token_count
        );
        if !self.prompt.confirm(&question).await {
            return Ok(PurchaseOutcome::Declined);
        }

        let request = TokenUnlockRequest::new(
            cmd.profile_id.clone(),
            cmd.video_id.clone(),
            credential.email().map(str::to_string),
            price.tokens_to_consume,
            token_count,
        )?;
        self.checkout
            .unlock_with_tokens(request)
            .await
            .map_err(|e| CheckoutError::initiation(CheckoutAction::TokenUnlock, e))?;

        tracing::info!(video_id = %cmd.video_id, "Content unlocked with tokens");
        self.prompt.alert(UserAlert::info("Content unlocked! Refreshing page..."));

        // Unlock shows only once the backend reports it
        let resolved = self.entitlements.resolve(Some(credential), &cmd.profile_id).await;
        Ok(PurchaseOutcome::TokenUnlocked { resolved })
    }

    fn redirect_to_login(&self, return_path: &str) -> PurchaseOutcome {
        let url = login_redirect(&self.app_url, return_path, false);
        self.navigator.navigate_current(&url);
        PurchaseOutcome::LoginRedirect { url }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ui::NavigationEvent;
    use crate::application::handlers::test_support::{profile_id, video_id, Harness, FAN};
    use crate::domain::foundation::Cents;
    use crate::domain::membership::record::test_support::active_membership;
    use crate::domain::pricing::PriceRule;
    use crate::ports::AlertSeverity;

    fn handler(h: &Harness) -> PurchaseContentHandler {
        PurchaseContentHandler::new(
            h.catalog.clone(),
            h.entitlements.clone(),
            Arc::new(h.credentials.clone()),
            h.storefront.clone(),
            Arc::new(h.navigator.clone()),
            Arc::new(h.prompt.clone()),
            h.clock.clone(),
            h.in_flight.clone(),
            h.app_url.clone(),
            "en",
        )
    }

    fn buy(video: &str, known_tokens: u32) -> PurchaseContentCommand {
        PurchaseContentCommand {
            profile_id: profile_id("profile1"),
            video_id: video_id(video),
            return_path: "/u/creator-one/profile1".to_string(),
            known_token_count: known_tokens,
        }
    }

    fn quote_of(outcome: PurchaseOutcome) -> PriceQuote {
        match outcome {
            PurchaseOutcome::CheckoutOpened { quote, .. } => quote,
            other => panic!("expected checkout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn signed_out_viewer_is_sent_to_login() {
        let h = Harness::new();
        let outcome = handler(&h).handle(buy("video3", 0)).await.unwrap();

        let PurchaseOutcome::LoginRedirect { url } = outcome else {
            panic!("expected login redirect");
        };
        assert_eq!(url.path(), "/login");
        assert_eq!(h.navigator.current_url(), Some(url));
        assert!(!h.storefront.was_called("create_content_session"));
    }

    #[tokio::test]
    async fn base_price_checkout_opens_in_reserved_tab() {
        let h = Harness::new().signed_in();
        let outcome = handler(&h).handle(buy("video3", 0)).await.unwrap();

        let PurchaseOutcome::CheckoutOpened { quote, target, .. } = outcome else {
            panic!("expected checkout");
        };
        assert_eq!(quote.amount_due, Cents::new(699));
        assert!(matches!(target, NavigationTarget::ReservedTab(_)));
        let sessions = h.storefront.content_sessions();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].amount_due, Cents::new(699));
        assert_eq!(sessions[0].customer_email.as_deref(), Some(FAN));
    }

    #[tokio::test]
    async fn promotion_price_is_charged_for_members() {
        let h = Harness::new().signed_in();
        let mut membership = active_membership("profile1");
        membership.promotion_expires_at = Some(h.clock.now().plus_secs(600));
        h.storefront.grant_membership(FAN, membership);

        let quote = quote_of(handler(&h).handle(buy("video3", 0)).await.unwrap());

        assert_eq!(quote.rule, PriceRule::Promotion);
        assert_eq!(quote.amount_due, Cents::new(580));
    }

    #[tokio::test]
    async fn one_token_halves_the_price_and_is_sent_with_the_session() {
        let h = Harness::new().signed_in();
        h.storefront.set_tokens(FAN, "profile1", 1, 10);

        let quote = quote_of(handler(&h).handle(buy("video3", 1)).await.unwrap());

        assert_eq!(quote.amount_due, Cents::new(350));
        assert_eq!(h.storefront.content_sessions()[0].tokens_to_use, 1);
    }

    #[tokio::test]
    async fn stale_page_balance_is_ignored_in_favour_of_fresh_resolution() {
        let h = Harness::new().signed_in();
        h.storefront.set_tokens(FAN, "profile1", 1, 10);

        // Page still shows two tokens from an earlier render
        let quote = quote_of(handler(&h).handle(buy("video3", 2)).await.unwrap());

        assert_eq!(quote.rule, PriceRule::TokenHalfPrice);
        assert!(h.prompt.confirmations().is_empty());
    }

    #[tokio::test]
    async fn two_tokens_unlock_for_free_after_confirmation() {
        let h = Harness::new().signed_in();
        h.storefront.set_tokens(FAN, "profile1", 2, 10);
        h.prompt.answer_next(true);

        let outcome = handler(&h).handle(buy("video3", 2)).await.unwrap();

        let PurchaseOutcome::TokenUnlocked { resolved } = outcome else {
            panic!("expected token unlock");
        };
        assert!(resolved.snapshot.owns(&video_id("video3")));
        assert_eq!(resolved.snapshot.token_count(), 0);
        assert_eq!(
            h.prompt.confirmations(),
            vec!["Use 2 tokens to unlock this content for FREE?\n\nYou have 2 tokens.".to_string()]
        );
        assert_eq!(h.prompt.last_alert().unwrap().severity, AlertSeverity::Info);
        assert!(!h.storefront.was_called("create_content_session"));
        assert_eq!(h.navigator.open_targets(), 0);
    }

    #[tokio::test]
    async fn declining_the_token_unlock_spends_nothing() {
        let h = Harness::new().signed_in();
        h.storefront.set_tokens(FAN, "profile1", 3, 10);
        h.prompt.answer_next(false);

        let outcome = handler(&h).handle(buy("video3", 3)).await.unwrap();

        assert_eq!(outcome, PurchaseOutcome::Declined);
        assert!(!h.storefront.was_called("unlock_with_tokens"));
    }

    #[tokio::test]
    async fn failed_session_creation_closes_tab_and_alerts() {
        let h = Harness::new().signed_in();
        h.storefront
            .set_method_error("create_content_session", ServiceError::server("boom"));

        let err = handler(&h).handle(buy("video3", 0)).await.unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::Initiation {
                action: CheckoutAction::ContentCheckout,
                ..
            }
        ));
        assert_eq!(h.navigator.open_targets(), 0);
        assert!(matches!(h.navigator.events().last(), Some(NavigationEvent::Closed { .. })));
        assert_eq!(
            h.prompt.last_alert().unwrap().message,
            "Failed to start checkout. Please try again."
        );
        assert!(!h.in_flight.is_in_flight("content:profile1:video3"));
    }

    #[tokio::test]
    async fn owned_item_is_not_charged_again() {
        let h = Harness::new().signed_in();
        h.storefront.grant_purchase(FAN, "profile1", "video3", 699);

        let outcome = handler(&h).handle(buy("video3", 0)).await.unwrap();

        assert_eq!(outcome, PurchaseOutcome::AlreadyOwned);
        assert_eq!(h.navigator.open_targets(), 0);
    }

    #[tokio::test]
    async fn unavailable_backend_blocks_pricing() {
        let h = Harness::new().signed_in();
        h.storefront.set_method_error("verify_token", ServiceError::network("down"));

        let err = handler(&h).handle(buy("video3", 0)).await.unwrap_err();

        assert!(matches!(err, CheckoutError::Initiation { .. }));
        assert!(!h.storefront.was_called("create_content_session"));
        assert_eq!(h.navigator.open_targets(), 0);
    }

    #[tokio::test]
    async fn membership_items_are_not_sold_individually() {
        let h = Harness::new().signed_in();
        let err = handler(&h).handle(buy("video2", 0)).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Pricing(_)));
    }
}
