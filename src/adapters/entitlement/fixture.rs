//! Canned entitlements for demos and tests.
//!
//! Never talks to the backend. Refused by config validation in production.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::Catalog;
use crate::domain::credential::Credential;
use crate::domain::entitlement::{EntitlementSnapshot, PurchaseTokens, ResolvedEntitlements};
use crate::domain::foundation::ProfileId;
use crate::domain::membership::{Membership, MembershipStatus};
use crate::ports::EntitlementSource;

/// Which viewer to pretend to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationScenario {
    /// No membership, nothing purchased.
    None,
    /// Active membership with one token.
    Membership,
    /// Active membership, every item purchased, three tokens.
    All,
}

impl fmt::Display for SimulationScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SimulationScenario::None => "none",
            SimulationScenario::Membership => "membership",
            SimulationScenario::All => "all",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for SimulationScenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "free" => Ok(SimulationScenario::None),
            "membership" => Ok(SimulationScenario::Membership),
            "all" => Ok(SimulationScenario::All),
            other => Err(format!("Unknown simulation scenario: {}", other)),
        }
    }
}

pub struct FixtureEntitlementSource {
    scenario: SimulationScenario,
    catalog: Arc<Catalog>,
}

impl FixtureEntitlementSource {
    pub fn new(scenario: SimulationScenario, catalog: Arc<Catalog>) -> Self {
        Self { scenario, catalog }
    }

    pub fn scenario(&self) -> SimulationScenario {
        self.scenario
    }

    fn snapshot(&self, profile_id: &ProfileId) -> EntitlementSnapshot {
        let member = |token_count, days_remaining| EntitlementSnapshot {
            has_membership: true,
            membership: Some(Membership {
                profile_id: profile_id.clone(),
                status: MembershipStatus::Active,
                cancel_at_period_end: false,
                current_period_end: None,
                promotion_expires_at: None,
            }),
            purchased_video_ids: BTreeSet::new(),
            tokens: Some(PurchaseTokens {
                profile_id: profile_id.clone(),
                token_count,
                days_remaining,
            }),
        };

        match self.scenario {
            SimulationScenario::None => EntitlementSnapshot::locked(),
            SimulationScenario::Membership => member(1, 10),
            SimulationScenario::All => {
                let mut snapshot = member(3, 15);
                if let Some(profile) = self.catalog.profile(profile_id) {
                    snapshot.purchased_video_ids = profile.items.iter().map(|i| i.id.clone()).collect();
                }
                snapshot
            }
        }
    }
}

#[async_trait]
impl EntitlementSource for FixtureEntitlementSource {
    async fn resolve(&self, _credential: Option<&Credential>, profile_id: &ProfileId) -> ResolvedEntitlements {
        tracing::debug!(profile_id = %profile_id, scenario = %self.scenario, "Resolving simulated entitlements");
        ResolvedEntitlements::simulated(self.snapshot(profile_id))
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{ContentItem, ContentKind, MediaRefs, Profile};
    use crate::domain::entitlement::ResolutionStatus;
    use crate::domain::foundation::{Cents, VideoId};

    fn catalog() -> Arc<Catalog> {
        let item = |id: &str, kind| ContentItem {
            id: VideoId::new(id).unwrap(),
            title: id.to_string(),
            kind,
            base_price: Cents::new(500),
            media: MediaRefs {
                preview: format!("{}-preview", id),
                full: format!("{}-full", id),
            },
        };
        Arc::new(
            Catalog::new(vec![Profile {
                id: ProfileId::new("profile1").unwrap(),
                display_name: "Creator One".into(),
                membership_price: Some(Cents::new(999)),
                promotion_percentage: None,
                items: vec![item("video1", ContentKind::Free), item("video3", ContentKind::Paid)],
            }])
            .unwrap(),
        )
    }

    async fn resolve(scenario: SimulationScenario) -> ResolvedEntitlements {
        FixtureEntitlementSource::new(scenario, catalog())
            .resolve(None, &ProfileId::new("profile1").unwrap())
            .await
    }

    #[tokio::test]
    async fn none_is_fully_locked() {
        let resolved = resolve(SimulationScenario::None).await;
        assert_eq!(resolved.status, ResolutionStatus::Simulated);
        assert!(resolved.snapshot.is_locked());
    }

    #[tokio::test]
    async fn membership_has_one_token_and_no_purchases() {
        let resolved = resolve(SimulationScenario::Membership).await;
        assert!(resolved.snapshot.has_membership);
        assert!(resolved.snapshot.purchased_video_ids.is_empty());
        assert_eq!(resolved.snapshot.token_count(), 1);
        assert_eq!(resolved.snapshot.tokens.unwrap().days_remaining, 10);
    }

    #[tokio::test]
    async fn all_owns_every_item() {
        let resolved = resolve(SimulationScenario::All).await;
        assert_eq!(resolved.snapshot.purchased_video_ids.len(), 2);
        assert_eq!(resolved.snapshot.token_count(), 3);
    }

    #[test]
    fn scenario_parses_case_insensitively() {
        assert_eq!("ALL".parse::<SimulationScenario>().unwrap(), SimulationScenario::All);
        assert!("gold".parse::<SimulationScenario>().is_err());
    }
}
