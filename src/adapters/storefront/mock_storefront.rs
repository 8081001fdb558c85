//! In-process storefront backend for testing.
//!
//! Implements both backend ports over shared in-memory state, so a checkout
//! started through `CheckoutService` shows up in the next `verify_token`.
//! Supports:
//! - Accounts, memberships, purchases, and token balances per email
//! - Checkout sessions completed on `verify_checkout_session` (idempotent)
//! - Access token refresh and account deletion
//! - Error injection
//! - Call tracking

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::adapters::auth::{credential_from_tokens, encode_claims, TokenClaims};
use crate::adapters::clock::SystemClock;
use crate::domain::credential::Credential;
use crate::domain::entitlement::{
    AccountUser, PurchaseTokens, PurchasedContent, VerifiedAccount, DEFAULT_DAYS_UNTIL_NEXT_TOKEN,
};
use crate::domain::foundation::{Cents, ProfileId, UserId, VideoId};
use crate::domain::membership::{Membership, MembershipStatus};
use crate::ports::{
    CheckoutRedirect, CheckoutService, Clock, ContentCheckoutRequest, FreeMembershipRequest,
    MembershipCheckoutRequest, ServiceError, TokenUnlockRequest, VerificationService,
    VerifySessionRequest,
};

const SIGNING_SECRET: &[u8] = b"mock-storefront-secret";
const TOKEN_TTL_SECS: i64 = 60 * 60;
const MEMBERSHIP_PERIOD_DAYS: i64 = 30;
const CHECKOUT_HOST: &str = "https://checkout.storefront.test/";

fn checkout_url(path: &str) -> Result<Url, ServiceError> {
    Url::parse(CHECKOUT_HOST)
        .and_then(|base| base.join(path))
        .map_err(|e| ServiceError::server(e.to_string()))
}

/// Recorded method call for assertions.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone)]
struct Account {
    user: AccountUser,
    memberships: Vec<Membership>,
    purchases: Vec<PurchasedContent>,
    tokens: Vec<PurchaseTokens>,
}

impl Account {
    fn new(email: &str, n: u64) -> Self {
        Self {
            user: AccountUser {
                id: UserId::new(format!("user-{}", n)).expect("formatted user id is never empty"),
                email: Some(email.to_string()),
            },
            memberships: Vec::new(),
            purchases: Vec::new(),
            tokens: Vec::new(),
        }
    }

    fn to_verified(&self) -> VerifiedAccount {
        VerifiedAccount {
            user: Some(self.user.clone()),
            memberships: self.memberships.clone(),
            purchased_content: self.purchases.clone(),
            purchase_tokens: self.tokens.clone(),
        }
    }

    fn upsert_membership(&mut self, membership: Membership) {
        self.memberships.retain(|m| m.profile_id != membership.profile_id);
        self.memberships.push(membership);
    }

    fn tokens_mut(&mut self, profile_id: &ProfileId) -> &mut PurchaseTokens {
        if let Some(index) = self.tokens.iter().position(|t| &t.profile_id == profile_id) {
            return &mut self.tokens[index];
        }
        self.tokens.push(PurchaseTokens {
            profile_id: profile_id.clone(),
            token_count: 0,
            days_remaining: DEFAULT_DAYS_UNTIL_NEXT_TOKEN,
        });
        let last = self.tokens.len() - 1;
        &mut self.tokens[last]
    }

    fn add_purchase(&mut self, purchase: PurchasedContent) {
        let owned = self
            .purchases
            .iter()
            .any(|p| p.profile_id == purchase.profile_id && p.video_id == purchase.video_id);
        if !owned {
            self.purchases.push(purchase);
        }
    }
}

#[derive(Debug, Clone)]
enum SessionKind {
    Membership {
        profile_id: ProfileId,
    },
    Content {
        profile_id: ProfileId,
        video_id: VideoId,
        amount: Cents,
        tokens_to_use: u32,
    },
}

#[derive(Debug, Clone)]
struct PendingSession {
    email: Option<String>,
    kind: SessionKind,
    completed: bool,
}

#[derive(Default)]
struct MockState {
    accounts: HashMap<String, Account>,
    access_tokens: HashMap<String, String>,
    refresh_tokens: HashMap<String, String>,
    sessions: HashMap<String, PendingSession>,
    content_sessions: Vec<ContentCheckoutRequest>,
    membership_sessions: Vec<MembershipCheckoutRequest>,
    token_unlocks: Vec<TokenUnlockRequest>,
    pending_awards: u32,
    next_id: u64,

    /// Error to return on next call.
    next_error: Option<ServiceError>,

    /// Specific errors by method name.
    method_errors: HashMap<String, ServiceError>,

    call_log: Vec<MethodCall>,
}

impl MockState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn account_mut(&mut self, email: &str) -> &mut Account {
        let n = self.next_id();
        self.accounts
            .entry(email.to_string())
            .or_insert_with(|| Account::new(email, n))
    }

    fn email_for(&self, access_token: &str) -> Result<String, ServiceError> {
        self.access_tokens
            .get(access_token)
            .cloned()
            .ok_or_else(|| ServiceError::unauthorized("Invalid or expired token").with_status(401))
    }
}

/// Mock storefront backend.
///
/// # Example
///
/// ```ignore
/// let storefront = Arc::new(MockStorefront::new());
/// let credential = storefront.sign_in("fan@example.com");
/// storefront.set_tokens("fan@example.com", "profile1", 2, 12);
/// ```
#[derive(Clone)]
pub struct MockStorefront {
    inner: Arc<Mutex<MockState>>,
    clock: Arc<dyn Clock>,
}

impl Default for MockStorefront {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStorefront {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Issues credentials relative to `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockState::default())),
            clock,
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Account Setup
    // ════════════════════════════════════════════════════════════════════════════

    /// Creates the account if needed and returns a fresh credential for it.
    pub fn sign_in(&self, email: &str) -> Credential {
        let mut state = self.state();
        state.account_mut(email);
        self.issue_credential(&mut state, email)
    }

    /// Adds or replaces the account's membership on that profile.
    pub fn grant_membership(&self, email: &str, membership: Membership) {
        self.state().account_mut(email).upsert_membership(membership);
    }

    pub fn grant_purchase(&self, email: &str, profile_id: &str, video_id: &str, amount: u64) {
        let (Ok(profile_id), Ok(video_id)) = (ProfileId::new(profile_id), VideoId::new(video_id)) else {
            return;
        };
        let now = self.clock.now();
        self.state().account_mut(email).add_purchase(PurchasedContent {
            profile_id,
            video_id,
            amount: Cents::new(amount),
            created_at: Some(now),
        });
    }

    pub fn set_tokens(&self, email: &str, profile_id: &str, token_count: u32, days_remaining: u32) {
        let Ok(profile_id) = ProfileId::new(profile_id) else {
            return;
        };
        let mut state = self.state();
        let tokens = state.account_mut(email).tokens_mut(&profile_id);
        tokens.token_count = token_count;
        tokens.days_remaining = days_remaining;
    }

    /// Invalidates every access token issued to `email`.
    pub fn revoke_credentials(&self, email: &str) {
        self.state().access_tokens.retain(|_, owner| owner != email);
    }

    /// Count reported by the next `award_pending_tokens`.
    pub fn set_pending_awards(&self, count: u32) {
        self.state().pending_awards = count;
    }

    /// Current server-side view of an account.
    pub fn account(&self, email: &str) -> Option<VerifiedAccount> {
        self.state().accounts.get(email).map(Account::to_verified)
    }

    pub fn content_sessions(&self) -> Vec<ContentCheckoutRequest> {
        self.state().content_sessions.clone()
    }

    pub fn membership_sessions(&self) -> Vec<MembershipCheckoutRequest> {
        self.state().membership_sessions.clone()
    }

    pub fn token_unlocks(&self) -> Vec<TokenUnlockRequest> {
        self.state().token_unlocks.clone()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Error Injection
    // ════════════════════════════════════════════════════════════════════════════

    /// Set an error to return on the next call to any method.
    pub fn set_error(&self, error: ServiceError) {
        self.state().next_error = Some(error);
    }

    /// Set an error for a specific method.
    pub fn set_method_error(&self, method: &str, error: ServiceError) {
        self.state().method_errors.insert(method.to_string(), error);
    }

    /// Clear all configured errors.
    pub fn clear_errors(&self) {
        let mut state = self.state();
        state.next_error = None;
        state.method_errors.clear();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    pub fn calls(&self) -> Vec<MethodCall> {
        self.state().call_log.clone()
    }

    pub fn was_called(&self, method: &str) -> bool {
        self.state().call_log.iter().any(|c| c.method == method)
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.state().call_log.iter().filter(|c| c.method == method).count()
    }

    pub fn clear_calls(&self) {
        self.state().call_log.clear();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Internal Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record_call(&self, method: &str, args: Vec<String>) {
        self.state().call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
    }

    fn check_error(&self, method: &str) -> Result<(), ServiceError> {
        let mut state = self.state();

        if let Some(error) = state.method_errors.get(method) {
            return Err(error.clone());
        }

        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        Ok(())
    }

    fn issue_credential(&self, state: &mut MockState, email: &str) -> Credential {
        let refresh = format!("refresh-{}", state.next_id());
        state.refresh_tokens.insert(refresh.clone(), email.to_string());
        self.issue_access(state, email, refresh)
    }

    fn issue_access(&self, state: &mut MockState, email: &str, refresh: String) -> Credential {
        let n = state.next_id();
        let user = state.account_mut(email).user.clone();
        let claims = TokenClaims {
            sub: Some(user.id.as_str().to_string()),
            user_id: None,
            email: Some(email.to_string()),
            exp: Some(self.clock.now().plus_secs(TOKEN_TTL_SECS).as_unix_secs()),
        };
        let access = encode_claims(&claims, SIGNING_SECRET).unwrap_or_else(|_| format!("opaque-access-{}", n));
        state.access_tokens.insert(access.clone(), email.to_string());
        credential_from_tokens(access, Some(refresh), Some(&user))
    }

    fn new_redirect(&self, state: &mut MockState, session: PendingSession) -> Result<CheckoutRedirect, ServiceError> {
        let session_id = format!("cs_test_{}", state.next_id());
        let url = checkout_url(&format!("c/pay/{}", session_id))?;
        state.sessions.insert(session_id.clone(), session);
        Ok(CheckoutRedirect {
            session_id: Some(session_id),
            url,
        })
    }
}

#[async_trait]
impl VerificationService for MockStorefront {
    async fn verify_token(&self, access_token: &SecretString) -> Result<VerifiedAccount, ServiceError> {
        self.record_call("verify_token", vec![]);
        self.check_error("verify_token")?;

        let state = self.state();
        let email = state.email_for(access_token.expose_secret())?;
        state
            .accounts
            .get(&email)
            .map(Account::to_verified)
            .ok_or_else(|| ServiceError::unauthorized("Account no longer exists").with_status(401))
    }

    async fn verify_checkout_session(
        &self,
        request: VerifySessionRequest,
    ) -> Result<Credential, ServiceError> {
        self.record_call(
            "verify_checkout_session",
            vec![request.session_id.clone(), request.profile_id.to_string()],
        );
        self.check_error("verify_checkout_session")?;

        let now = self.clock.now();
        let mut state = self.state();
        let session = state
            .sessions
            .get(&request.session_id)
            .cloned()
            .ok_or_else(|| ServiceError::rejected("Unknown checkout session").with_status(404))?;

        let session_profile = match &session.kind {
            SessionKind::Membership { profile_id } | SessionKind::Content { profile_id, .. } => profile_id,
        };
        if session_profile != &request.profile_id {
            return Err(ServiceError::rejected("Session belongs to another profile").with_status(400));
        }

        let email = match session.email.clone() {
            Some(email) => email,
            None => format!("guest-{}@storefront.test", state.next_id()),
        };

        if !session.completed {
            let account = state.account_mut(&email);
            match &session.kind {
                SessionKind::Membership { profile_id } => {
                    account.upsert_membership(Membership {
                        profile_id: profile_id.clone(),
                        status: MembershipStatus::Active,
                        cancel_at_period_end: false,
                        current_period_end: Some(now.plus_days(MEMBERSHIP_PERIOD_DAYS)),
                        promotion_expires_at: None,
                    });
                    account.tokens_mut(profile_id);
                }
                SessionKind::Content {
                    profile_id,
                    video_id,
                    amount,
                    tokens_to_use,
                } => {
                    account.add_purchase(PurchasedContent {
                        profile_id: profile_id.clone(),
                        video_id: video_id.clone(),
                        amount: *amount,
                        created_at: Some(now),
                    });
                    if *tokens_to_use > 0 {
                        let tokens = account.tokens_mut(profile_id);
                        tokens.token_count = tokens.token_count.saturating_sub(*tokens_to_use);
                    }
                }
            }
            if let Some(stored) = state.sessions.get_mut(&request.session_id) {
                stored.completed = true;
                stored.email = Some(email.clone());
            }
        }

        Ok(self.issue_credential(&mut state, &email))
    }

    async fn award_pending_tokens(&self) -> Result<u32, ServiceError> {
        self.record_call("award_pending_tokens", vec![]);
        self.check_error("award_pending_tokens")?;

        Ok(std::mem::take(&mut self.state().pending_awards))
    }

    async fn refresh_access_token(&self, refresh_token: &SecretString) -> Result<Credential, ServiceError> {
        self.record_call("refresh_access_token", vec![]);
        self.check_error("refresh_access_token")?;

        let mut state = self.state();
        let email = state
            .refresh_tokens
            .get(refresh_token.expose_secret())
            .cloned()
            .ok_or_else(|| ServiceError::unauthorized("Invalid refresh token").with_status(401))?;
        Ok(self.issue_access(&mut state, &email, refresh_token.expose_secret().clone()))
    }

    async fn logout(&self, refresh_token: &SecretString) -> Result<(), ServiceError> {
        self.record_call("logout", vec![]);
        self.check_error("logout")?;

        let mut state = self.state();
        if let Some(email) = state.refresh_tokens.remove(refresh_token.expose_secret()) {
            state.access_tokens.retain(|_, owner| owner != &email);
        }
        Ok(())
    }

    async fn delete_account(&self, user_id: &UserId) -> Result<(), ServiceError> {
        self.record_call("delete_account", vec![user_id.to_string()]);
        self.check_error("delete_account")?;

        let mut state = self.state();
        let email = state
            .accounts
            .iter()
            .find(|(_, account)| &account.user.id == user_id)
            .map(|(email, _)| email.clone())
            .ok_or_else(|| ServiceError::rejected("Account not found").with_status(404))?;
        state.accounts.remove(&email);
        state.access_tokens.retain(|_, owner| owner != &email);
        state.refresh_tokens.retain(|_, owner| owner != &email);
        Ok(())
    }
}

#[async_trait]
impl CheckoutService for MockStorefront {
    async fn create_membership_session(
        &self,
        request: MembershipCheckoutRequest,
    ) -> Result<CheckoutRedirect, ServiceError> {
        self.record_call(
            "create_membership_session",
            vec![request.profile_id.to_string(), request.membership_price.to_string()],
        );
        self.check_error("create_membership_session")?;

        if request.membership_price.is_zero() {
            return Err(ServiceError::rejected("Membership price must be positive").with_status(400));
        }

        let mut state = self.state();
        state.membership_sessions.push(request.clone());
        self.new_redirect(
            &mut state,
            PendingSession {
                email: request.customer_email,
                kind: SessionKind::Membership {
                    profile_id: request.profile_id,
                },
                completed: false,
            },
        )
    }

    async fn create_content_session(
        &self,
        request: ContentCheckoutRequest,
    ) -> Result<CheckoutRedirect, ServiceError> {
        self.record_call(
            "create_content_session",
            vec![
                request.video_id.to_string(),
                request.amount_due.to_string(),
                request.tokens_to_use.to_string(),
            ],
        );
        self.check_error("create_content_session")?;

        if request.amount_due.is_zero() {
            return Err(ServiceError::rejected("contentPrice must be positive").with_status(400));
        }

        let mut state = self.state();
        state.content_sessions.push(request.clone());
        self.new_redirect(
            &mut state,
            PendingSession {
                email: request.customer_email,
                kind: SessionKind::Content {
                    profile_id: request.profile_id,
                    video_id: request.video_id,
                    amount: request.amount_due,
                    tokens_to_use: request.tokens_to_use,
                },
                completed: false,
            },
        )
    }

    async fn unlock_with_tokens(&self, request: TokenUnlockRequest) -> Result<(), ServiceError> {
        self.record_call(
            "unlock_with_tokens",
            vec![request.video_id().to_string(), request.tokens_to_use().to_string()],
        );
        self.check_error("unlock_with_tokens")?;

        let now = self.clock.now();
        let mut state = self.state();
        let Some(account) = state.accounts.get_mut(request.customer_email()) else {
            return Err(ServiceError::rejected("Unknown customer").with_status(404));
        };

        let tokens = account.tokens_mut(request.profile_id());
        if tokens.token_count < request.tokens_to_use() {
            return Err(ServiceError::rejected("Insufficient tokens").with_status(400));
        }
        tokens.token_count -= request.tokens_to_use();

        account.add_purchase(PurchasedContent {
            profile_id: request.profile_id().clone(),
            video_id: request.video_id().clone(),
            amount: Cents::ZERO,
            created_at: Some(now),
        });
        state.token_unlocks.push(request);
        Ok(())
    }

    async fn create_free_membership(&self, request: FreeMembershipRequest) -> Result<(), ServiceError> {
        self.record_call("create_free_membership", vec![request.profile_id.to_string()]);
        self.check_error("create_free_membership")?;

        let mut state = self.state();
        let email = state.email_for(request.access_token.expose_secret())?;
        state.account_mut(&email).upsert_membership(Membership {
            profile_id: request.profile_id,
            status: MembershipStatus::Active,
            cancel_at_period_end: false,
            current_period_end: None,
            promotion_expires_at: None,
        });
        Ok(())
    }

    async fn create_portal_session(&self, customer_email: &str) -> Result<CheckoutRedirect, ServiceError> {
        self.record_call("create_portal_session", vec![customer_email.to_string()]);
        self.check_error("create_portal_session")?;

        let url = checkout_url("p/session")?;
        Ok(CheckoutRedirect { session_id: None, url })
    }
}
