// crates/edge/src/settings.rs

//! Layered settings: optional TOML file, then `STOREFRONT__*` environment
//! variables (`STOREFRONT__COMMERCE__STORE_DOMAIN` sets `commerce.store_domain`).

use crate::error::Error;
use config::{Config, Environment, File, FileFormat};
use domain::setting::Settings;
use std::{collections::HashMap, path::Path};

pub const ENV_PREFIX: &str = "STOREFRONT";
const ENV_SEPARATOR: &str = "__";

#[tracing::instrument(skip_all)]
pub fn load(file: Option<&Path>) -> Result<Settings, Error> {
    layered(file, None)
}

/// `env` replaces the process environment when given.
pub(crate) fn layered(
    file: Option<&Path>,
    env: Option<HashMap<String, String>>,
) -> Result<Settings, Error> {
    let mut builder = Config::builder();
    if let Some(path) = file {
        builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
    }
    let settings = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .try_parsing(true)
                .source(env),
        )
        .build()?
        .try_deserialize::<Settings>()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::setting::{CmsRegion, FallbackPolicy};
    use secrecy::ExposeSecret;
    use std::io::Write;

    const TOML: &str = r#"
[server]
port = 8080

[site]
name = "Test Shop"

[commerce]
store_domain = "test.myshopify.com"
storefront_access_token = "public"

[cms]
access_token = "preview-token"
region = "us"
"#;

    #[test]
    fn file_then_environment() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(TOML.as_bytes()).unwrap();

        let env = HashMap::from([
            ("STOREFRONT__SERVER__PORT".to_owned(), "9090".to_owned()),
            ("STOREFRONT__RESOLVER__POLICY".to_owned(), "strict".to_owned()),
        ]);
        let settings = layered(Some(file.path()), Some(env)).unwrap();

        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.site.name, "Test Shop");
        assert_eq!(settings.commerce.api_version, "2024-10");
        assert_eq!(settings.commerce.cache_capacity, 1024);
        assert_eq!(settings.cms.region, CmsRegion::Us);
        assert_eq!(settings.cms.access_token.expose_secret(), "preview-token");
        assert_eq!(settings.resolver.policy, FallbackPolicy::Strict);
        assert!(settings.newsletter.mailchimp.is_none());
    }

    #[test]
    fn missing_required_sections_fail() {
        let err = layered(None, Some(HashMap::new())).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
