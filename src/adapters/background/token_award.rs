//! Opportunistic token award.
//!
//! Fired on page load, detached from entitlement resolution. The outcome is
//! only ever logged; nothing waits on it for correctness.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::ports::VerificationService;

/// Spawns a pending-token award call.
///
/// The handle is returned so tests and shutdown can await it; dropping it
/// leaves the task running.
pub struct TokenAwardTask {
    verification: Arc<dyn VerificationService>,
}

impl TokenAwardTask {
    pub fn new(verification: Arc<dyn VerificationService>) -> Self {
        Self { verification }
    }

    pub fn spawn(&self) -> JoinHandle<Option<u32>> {
        let verification = self.verification.clone();
        tokio::spawn(async move { award_once(verification.as_ref()).await })
    }
}

/// Runs one award and logs the outcome. `None` on failure.
pub async fn award_once(verification: &dyn VerificationService) -> Option<u32> {
    match verification.award_pending_tokens().await {
        Ok(count) => {
            tracing::debug!(awarded = count, "Pending purchase tokens awarded");
            Some(count)
        }
        Err(e) => {
            tracing::warn!(code = %e.code, error = %e.message, "Token award failed");
            None
        }
    }
}
