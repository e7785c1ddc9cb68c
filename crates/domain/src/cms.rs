// crates/domain/src/cms.rs

//! Headless CMS entities: stories, blocks and assets.
//!
//! A story's `content` is the root of a block tree. Block attributes are kept
//! as a raw JSON map because the CMS schema is editor-defined; the typed
//! accessors below treat empty strings as absent, which is how the CMS
//! reports fields an editor left blank.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

// ─────────────────────────────────────────────────────────────────────────────
// Blocks
// ─────────────────────────────────────────────────────────────────────────────

/// One node of CMS content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "_uid", default)]
    pub uid: String,

    /// Type tag used to pick a renderer.
    #[serde(default)]
    pub component: String,

    /// Every other attribute, verbatim.
    #[serde(flatten)]
    pub attrs: Map<String, Json>,
}

impl Block {
    pub fn new(uid: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            component: component.into(),
            attrs: Map::new(),
        }
    }

    /// Builder-style attribute setter, mostly useful for fixtures.
    pub fn with(mut self, key: &str, value: impl Into<Json>) -> Self {
        self.attrs.insert(key.to_owned(), value.into());
        self
    }

    pub fn value(&self, key: &str) -> Option<&Json> {
        self.attrs.get(key).filter(|v| !v.is_null())
    }

    /// A non-blank string attribute.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.attrs
            .get(key)
            .and_then(Json::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// Boolean attribute; accepts JSON booleans and the strings `"true"`/`"false"`.
    pub fn flag(&self, key: &str) -> bool {
        match self.attrs.get(key) {
            Some(Json::Bool(b)) => *b,
            Some(Json::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    /// Non-negative integer attribute; the CMS stores number fields as strings.
    pub fn number(&self, key: &str) -> Option<u64> {
        match self.attrs.get(key)? {
            Json::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
            Json::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Array-of-objects attribute, each object decoded as a block.
    ///
    /// Objects without a `component` key are still returned (with an empty
    /// type tag); they are plain nested records such as FAQ entries.
    pub fn items(&self, key: &str) -> Vec<Block> {
        match self.attrs.get(key) {
            Some(Json::Array(values)) => values
                .iter()
                .filter(|v| v.is_object())
                .filter_map(|v| serde_json::from_value(v.clone()).ok())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Nested blocks under `key`, in declared order.
    pub fn children(&self, key: &str) -> Vec<Block> {
        self.items(key)
            .into_iter()
            .filter(|b| !b.component.is_empty())
            .collect()
    }

    /// Asset attribute with a non-empty filename.
    pub fn asset(&self, key: &str) -> Option<Asset> {
        self.attrs.get(key).and_then(Asset::from_json)
    }

    pub fn assets(&self, key: &str) -> Vec<Asset> {
        match self.attrs.get(key) {
            Some(Json::Array(values)) => values.iter().filter_map(Asset::from_json).collect(),
            _ => Vec::new(),
        }
    }

    /// String-array attribute (e.g. product handles, tags).
    pub fn strings(&self, key: &str) -> Vec<String> {
        match self.attrs.get(key) {
            Some(Json::Array(values)) => values
                .iter()
                .filter_map(Json::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(str::to_owned)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Link-with-label attribute such as a hero call to action.
    pub fn call_to_action(&self, key: &str) -> Option<CallToAction> {
        self.attrs.get(key).and_then(CallToAction::from_json)
    }

    /// The whole block, as the CMS delivered it.
    pub fn to_json(&self) -> Json {
        serde_json::to_value(self).unwrap_or(Json::Null)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Assets and links
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(default)]
    pub id: Option<u64>,
    pub filename: String,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl Asset {
    pub fn from_json(value: &Json) -> Option<Self> {
        let asset: Asset = serde_json::from_value(value.clone()).ok()?;
        if asset.filename.trim().is_empty() {
            None
        } else {
            Some(asset)
        }
    }

    /// Alt text, or the given fallback when the editor left it blank.
    pub fn alt_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.alt
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .unwrap_or(fallback)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallToAction {
    pub text: String,
    pub url: String,
    pub style: Option<String>,
}

impl CallToAction {
    /// Accepts `{text, url}` where `url` is either a string or a CMS multilink
    /// object (`{cached_url}` / `{url}`). Both fields are required.
    pub fn from_json(value: &Json) -> Option<Self> {
        let text = value.get("text")?.as_str()?.trim();
        let url = match value.get("url")? {
            Json::String(s) => s.as_str(),
            Json::Object(link) => link
                .get("cached_url")
                .and_then(Json::as_str)
                .filter(|s| !s.is_empty())
                .or_else(|| link.get("url").and_then(Json::as_str))?,
            _ => return None,
        }
        .trim();

        if text.is_empty() || url.is_empty() {
            return None;
        }

        Some(Self {
            text: text.to_owned(),
            url: url.to_owned(),
            style: value
                .get("style")
                .and_then(Json::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_owned),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Stories
// ─────────────────────────────────────────────────────────────────────────────

/// A structured content document from the CMS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: u64,
    #[serde(default)]
    pub uuid: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub full_slug: String,
    pub content: Block,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tag_list: Vec<String>,
}

impl Story {
    /// SEO fields from the content's `seo` attribute.
    ///
    /// The CMS delivers this either as a plain object or as a list of SEO
    /// blocks, in which case the first one wins.
    pub fn seo(&self) -> StorySeo {
        match self.content.value("seo") {
            Some(Json::Array(items)) => items.first().map(StorySeo::from_json).unwrap_or_default(),
            Some(obj @ Json::Object(_)) => StorySeo::from_json(obj),
            _ => StorySeo::default(),
        }
    }

    pub fn excerpt(&self) -> Option<&str> {
        self.content.text("excerpt")
    }
}

/// SEO fields of a story; blank values are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StorySeo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<Asset>,
    pub twitter_title: Option<String>,
    pub twitter_description: Option<String>,
    pub twitter_image: Option<Asset>,
}

impl StorySeo {
    pub fn from_json(value: &Json) -> Self {
        let text = |key: &str| {
            value
                .get(key)
                .and_then(Json::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };
        let asset = |key: &str| value.get(key).and_then(Asset::from_json);

        Self {
            title: text("title"),
            description: text("description"),
            og_title: text("og_title"),
            og_description: text("og_description"),
            og_image: asset("og_image"),
            twitter_title: text("twitter_title"),
            twitter_description: text("twitter_description"),
            twitter_image: asset("twitter_image"),
        }
    }
}

/// Which revision of a story to read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Version {
    Draft,
    #[default]
    Published,
}

impl Version {
    pub fn for_preview(preview: bool) -> Self {
        if preview {
            Version::Draft
        } else {
            Version::Published
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Version::Draft => "draft",
            Version::Published => "published",
        }
    }
}

/// Listing request for stories under a slug prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryQuery {
    pub starts_with: String,
    pub version: Version,
    pub per_page: u32,
    pub page: u32,
}

impl StoryQuery {
    pub fn starting_with(prefix: impl Into<String>) -> Self {
        Self {
            starts_with: prefix.into(),
            ..Self::default()
        }
    }
}

impl Default for StoryQuery {
    fn default() -> Self {
        Self {
            starts_with: String::new(),
            version: Version::Published,
            per_page: 10,
            page: 1,
        }
    }
}

/// One page of a story listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoryPage {
    pub stories: Vec<Story>,
    pub total: u64,
    pub per_page: u32,
}
