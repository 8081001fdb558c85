//! Entitlement source port.
//!
//! Selected once at startup: the live source asks the verification service,
//! the fixture source returns canned snapshots outside production.

use async_trait::async_trait;

use crate::domain::credential::Credential;
use crate::domain::entitlement::ResolvedEntitlements;
use crate::domain::foundation::ProfileId;

#[async_trait]
pub trait EntitlementSource: Send + Sync {
    /// Resolves the viewer's rights on `profile_id`.
    ///
    /// Infallible by contract: every failure resolves to the all-locked
    /// snapshot with a status explaining why.
    async fn resolve(&self, credential: Option<&Credential>, profile_id: &ProfileId) -> ResolvedEntitlements;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}
