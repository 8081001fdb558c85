//! Entitlement resolution configuration

use serde::Deserialize;

use crate::adapters::entitlement::SimulationScenario;

use super::environment::Environment;
use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct EntitlementsConfig {
    /// Canned entitlements instead of the backend (non-production only)
    #[serde(default)]
    pub simulate: Option<SimulationScenario>,

    /// Fire the pending-token award on every page load
    #[serde(default = "default_award_pending_tokens")]
    pub award_pending_tokens: bool,
}

impl EntitlementsConfig {
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if environment.is_production() && self.simulate.is_some() {
            return Err(ValidationError::SimulationInProduction);
        }
        Ok(())
    }
}

impl Default for EntitlementsConfig {
    fn default() -> Self {
        Self {
            simulate: None,
            award_pending_tokens: default_award_pending_tokens(),
        }
    }
}

fn default_award_pending_tokens() -> bool {
    true
}
