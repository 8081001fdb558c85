//! Shared fixtures for handler tests.

use std::sync::Arc;

use url::Url;

use crate::adapters::clock::FixedClock;
use crate::adapters::credentials::InMemoryCredentialStore;
use crate::adapters::entitlement::LiveEntitlementSource;
use crate::adapters::storefront::MockStorefront;
use crate::adapters::ui::{RecordingNavigator, ScriptedPrompt};
use crate::application::in_flight::InFlightRegistry;
use crate::domain::catalog::{Catalog, ContentItem, ContentKind, MediaRefs, Profile};
use crate::domain::foundation::{Cents, Percentage, ProfileId, Timestamp, VideoId};

pub const FAN: &str = "fan@example.com";
pub const PAGE: &str = "https://fans.example/u/creator-one/profile1";

fn item(id: &str, kind: ContentKind, price: u64) -> ContentItem {
    ContentItem {
        id: VideoId::new(id).unwrap(),
        title: format!("Content {}", id),
        kind,
        base_price: Cents::new(price),
        media: MediaRefs {
            preview: format!("/previews/{}.mp4", id),
            full: format!("/videos/{}.mp4", id),
        },
    }
}

/// `profile1` is paid (9.99/month, 17% promotion); `profile2` is free.
pub fn catalog() -> Catalog {
    Catalog::new(vec![
        Profile {
            id: ProfileId::new("profile1").unwrap(),
            display_name: "Creator One".to_string(),
            membership_price: Some(Cents::new(999)),
            promotion_percentage: Some(Percentage::new(17)),
            items: vec![
                item("video1", ContentKind::Free, 0),
                item("video2", ContentKind::Membership, 0),
                item("video3", ContentKind::Paid, 699),
                item("video4", ContentKind::Paid, 499),
            ],
        },
        Profile {
            id: ProfileId::new("profile2").unwrap(),
            display_name: "Creator Two".to_string(),
            membership_price: None,
            promotion_percentage: None,
            items: vec![item("video5", ContentKind::Membership, 0)],
        },
    ])
    .unwrap()
}

/// Page-host and backend doubles wired together.
pub struct Harness {
    pub clock: Arc<FixedClock>,
    pub storefront: Arc<MockStorefront>,
    pub credentials: InMemoryCredentialStore,
    pub entitlements: Arc<LiveEntitlementSource>,
    pub navigator: RecordingNavigator,
    pub prompt: ScriptedPrompt,
    pub in_flight: InFlightRegistry,
    pub catalog: Arc<Catalog>,
    pub app_url: Url,
}

impl Harness {
    pub fn new() -> Self {
        let clock = Arc::new(FixedClock::new(Timestamp::now()));
        let storefront = Arc::new(MockStorefront::with_clock(clock.clone()));
        let entitlements = Arc::new(LiveEntitlementSource::new(storefront.clone(), clock.clone()));
        Self {
            clock,
            storefront,
            credentials: InMemoryCredentialStore::new(),
            entitlements,
            navigator: RecordingNavigator::at(Url::parse(PAGE).unwrap()),
            prompt: ScriptedPrompt::new(),
            in_flight: InFlightRegistry::new(),
            catalog: Arc::new(catalog()),
            app_url: Url::parse("https://fans.example/").unwrap(),
        }
    }

    pub fn signed_in(self) -> Self {
        let credential = self.storefront.sign_in(FAN);
        crate::ports::CredentialStore::store(&self.credentials, &credential).unwrap();
        self
    }
}

pub fn profile_id(id: &str) -> ProfileId {
    ProfileId::new(id).unwrap()
}

pub fn video_id(id: &str) -> VideoId {
    VideoId::new(id).unwrap()
}
