//! `fanpass` - resolve and render one profile page.
//!
//! Prints the rendered page, navigation events, alerts, and the cookies the
//! session would set as JSON on stdout. Logs go to stderr.

use std::sync::Arc;

use clap::Parser;
use serde::Serialize;
use url::Url;

use fanpass::adapters::catalog::load_catalog;
use fanpass::adapters::credentials::{CookieJarStore, CookieSettings};
use fanpass::adapters::entitlement::select_entitlement_source;
use fanpass::adapters::http::{StorefrontClient, StorefrontClientConfig};
use fanpass::adapters::ui::{NavigationEvent, RecordingNavigator, ScriptedPrompt};
use fanpass::adapters::SystemClock;
use fanpass::application::{PageServices, ProfilePage};
use fanpass::config::{init_tracing, AppConfig};
use fanpass::domain::checkout::has_indicators;
use fanpass::domain::foundation::ProfileId;
use fanpass::domain::unlock::PageView;
use fanpass::ports::{Clock, UserAlert};

#[derive(Parser, Debug)]
#[command(name = "fanpass", about = "Resolve and render a creator profile page")]
struct Args {
    /// Profile to render.
    profile_id: String,

    /// Page URL the viewer landed on, e.g. a checkout return.
    return_url: Option<Url>,

    /// `Cookie` header carrying the viewer's session.
    #[arg(long)]
    cookie: Option<String>,
}

#[derive(Serialize)]
struct Output {
    page: PageView,
    checkout_return: Option<String>,
    navigation: Vec<NavigationEvent>,
    alerts: Vec<UserAlert>,
    set_cookie: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config.logging)?;

    let base_url = config.api.base_url()?;
    let app_url = config.api.app_url()?;
    let catalog_path = config
        .catalog
        .path
        .clone()
        .ok_or("No catalog configured; set FANPASS__CATALOG__PATH")?;
    let catalog = Arc::new(load_catalog(&catalog_path).await?);

    let mut client_config = StorefrontClientConfig::new(base_url).with_timeout(config.api.request_timeout());
    if let Some(key) = config.api.internal_api_key.clone() {
        client_config = client_config.with_internal_api_key(key);
    }
    let storefront = Arc::new(StorefrontClient::new(client_config)?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let jar = Arc::new(match &args.cookie {
        Some(header) => CookieJarStore::from_cookie_header(header, CookieSettings::default()),
        None => CookieJarStore::new(CookieSettings::default()),
    });
    let entitlements = select_entitlement_source(
        config.entitlements.simulate,
        catalog.clone(),
        storefront.clone(),
        jar.clone(),
        clock.clone(),
    );

    let page_url = match args.return_url {
        Some(url) => url,
        None => app_url.join(&format!("u/{}", args.profile_id))?,
    };
    let navigator = RecordingNavigator::at(page_url.clone());
    let prompt = ScriptedPrompt::new();

    tracing::info!(
        profile_id = %args.profile_id,
        source = entitlements.name(),
        checkout_return = has_indicators(&page_url),
        "Opening profile page"
    );
    let services = PageServices {
        catalog,
        entitlements,
        credentials: jar.clone(),
        verification: storefront.clone(),
        checkout: storefront,
        navigator: Arc::new(navigator.clone()),
        prompt: Arc::new(prompt.clone()),
        clock,
        app_url,
        language: config.api.language.clone(),
        award_pending_tokens: config.entitlements.award_pending_tokens,
    };
    let page = ProfilePage::open(services, ProfileId::new(args.profile_id)?, page_url).await?;

    let output = Output {
        page: page.view(),
        checkout_return: page.checkout_return().map(|r| match r {
            Ok(outcome) => format!("{:?}", outcome),
            Err(e) => e.to_string(),
        }),
        navigation: navigator.events(),
        alerts: prompt.alerts(),
        set_cookie: jar.take_set_cookie_headers(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
