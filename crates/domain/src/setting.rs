use secrecy::SecretString;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// IP address the HTTP listener binds to
    #[serde(default = "default_ip")]
    pub ip: IpAddr,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            ip: default_ip(),
            port: default_port(),
        }
    }
}

fn default_ip() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    3000
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteSettings {
    #[serde(default = "default_site_name")]
    pub name: String,

    /// Used when the homepage story has no SEO description.
    #[serde(default = "default_site_description")]
    pub description: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            description: default_site_description(),
        }
    }
}

fn default_site_name() -> String {
    "Acme Store".to_owned()
}

fn default_site_description() -> String {
    "Shop premium quality products at Acme Store.".to_owned()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommerceSettings {
    /// e.g. `acme.myshopify.com`
    pub store_domain: String,
    pub storefront_access_token: SecretString,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Shared secret expected on the revalidation webhook.
    pub revalidation_secret: Option<SecretString>,
    /// Most cached read responses kept at once; the oldest go first.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

fn default_api_version() -> String {
    "2024-10".to_owned()
}

fn default_cache_capacity() -> usize {
    1024
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CmsRegion {
    #[default]
    Eu,
    Us,
    Ap,
    Ca,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CmsSettings {
    /// Preview-capable delivery token; also handed to the editor bridge.
    pub access_token: SecretString,
    #[serde(default)]
    pub region: CmsRegion,
    /// Secret required by the preview entry endpoint.
    pub preview_secret: Option<SecretString>,
    #[serde(default = "default_bridge_script_url")]
    pub bridge_script_url: String,
}

fn default_bridge_script_url() -> String {
    "//app.storyblok.com/f/storyblok-v2-latest.js".to_owned()
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailchimpSettings {
    pub api_key: SecretString,
    pub audience_id: String,
    /// Data-center prefix, e.g. `us21`.
    pub server_prefix: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsletterSettings {
    pub mailchimp: Option<MailchimpSettings>,
}

/// What the resolver does when a source fails (as opposed to missing).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Log and try the next source.
    #[default]
    Lenient,
    /// Stop and answer with a gateway error.
    Strict,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolverSettings {
    #[serde(default)]
    pub policy: FallbackPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub site: SiteSettings,
    pub commerce: CommerceSettings,
    pub cms: CmsSettings,
    #[serde(default)]
    pub newsletter: NewsletterSettings,
    #[serde(default)]
    pub resolver: ResolverSettings,
}
