// crates/edge/src/state.rs

use crate::error::Error;
use adapt::{MailchimpClient, ShopifyClient, StoryblokClient};
use domain::setting::{FallbackPolicy, Settings, SiteSettings};
use secrecy::{ExposeSecret, SecretString};
use serve::{
    backend::{CommerceBackend, MailingList, StoryBackend},
    blocks::Registry,
    preview::PreviewBridge,
    render::Layout,
    resolver::RouteResolver,
};
use std::sync::Arc;
use tracing::info;

/// Concrete clients, built once at start-up and torn down explicitly.
pub struct Services {
    pub commerce: Arc<ShopifyClient>,
    pub stories: Arc<StoryblokClient>,
    pub newsletter: Option<Arc<MailchimpClient>>,
}

impl Services {
    #[tracing::instrument(skip_all)]
    pub fn init(settings: &Settings) -> Result<Self, Error> {
        let commerce = Arc::new(ShopifyClient::new(&settings.commerce)?);
        let stories = Arc::new(StoryblokClient::new(&settings.cms)?);
        let newsletter = settings
            .newsletter
            .mailchimp
            .as_ref()
            .map(MailchimpClient::new)
            .transpose()?
            .map(Arc::new);

        if newsletter.is_none() {
            info!("newsletter provider not configured; signups are accepted and dropped");
        }

        Ok(Self {
            commerce,
            stories,
            newsletter,
        })
    }

    pub fn backends(&self) -> Backends {
        Backends {
            commerce: self.commerce.clone(),
            stories: self.stories.clone(),
            newsletter: self
                .newsletter
                .clone()
                .map(|n| n as Arc<dyn MailingList>),
        }
    }

    pub fn shutdown(&self) {
        let cached = self.commerce.cache().len();
        self.commerce.cache().clear();
        info!(cached, "services shut down");
    }
}

/// The trait objects handlers talk to.
#[derive(Clone)]
pub struct Backends {
    pub commerce: Arc<dyn CommerceBackend>,
    pub stories: Arc<dyn StoryBackend>,
    pub newsletter: Option<Arc<dyn MailingList>>,
}

/// The part of the settings the request handlers need.
#[derive(Debug, Clone, Default)]
pub struct StateConfig {
    pub site: SiteSettings,
    pub policy: FallbackPolicy,
    pub preview_secret: Option<SecretString>,
    pub bridge_script_url: String,
    pub bridge_token: String,
}

impl StateConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            site: settings.site.clone(),
            policy: settings.resolver.policy,
            preview_secret: settings.cms.preview_secret.clone(),
            bridge_script_url: settings.cms.bridge_script_url.clone(),
            bridge_token: settings.cms.access_token.expose_secret().to_owned(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub backends: Backends,
    pub resolver: Arc<RouteResolver>,
    pub layout: Arc<Layout>,
    pub preview_secret: Option<SecretString>,
}

impl AppState {
    pub fn new(backends: Backends, config: StateConfig) -> Result<Self, Error> {
        let bridge = PreviewBridge::new(config.bridge_script_url, config.bridge_token);
        let layout = Arc::new(Layout::new(config.site, bridge)?);
        let resolver = Arc::new(RouteResolver::new(
            backends.commerce.clone(),
            backends.stories.clone(),
            Arc::new(Registry::standard()),
            layout.clone(),
            config.policy,
        ));

        Ok(Self {
            backends,
            resolver,
            layout,
            preview_secret: config.preview_secret,
        })
    }
}
