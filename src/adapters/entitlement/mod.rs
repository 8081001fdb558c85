//! Entitlement source adapters.
//!
//! Exactly one is selected at startup by [`select_entitlement_source`].

mod fixture;
mod live;

use std::sync::Arc;

pub use fixture::{FixtureEntitlementSource, SimulationScenario};
pub use live::LiveEntitlementSource;

use crate::domain::catalog::Catalog;
use crate::ports::{Clock, CredentialStore, EntitlementSource, VerificationService};

/// Picks the fixture source when a scenario is configured, the live source
/// otherwise. The live source refreshes stale tokens into `credentials`.
pub fn select_entitlement_source(
    simulate: Option<SimulationScenario>,
    catalog: Arc<Catalog>,
    verification: Arc<dyn VerificationService>,
    credentials: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
) -> Arc<dyn EntitlementSource> {
    match simulate {
        Some(scenario) => {
            tracing::warn!(scenario = %scenario, "Using simulated entitlements");
            Arc::new(FixtureEntitlementSource::new(scenario, catalog))
        }
        None => Arc::new(LiveEntitlementSource::new(verification, clock).with_token_refresh(credentials)),
    }
}
