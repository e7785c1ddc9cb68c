use crate::{cms::Story, commerce::Page};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Query parameter whose presence puts a request in preview mode.
pub const PREVIEW_PARAM: &str = "_storyblok";

/// Query parameter carrying the editor's preview token, if any.
pub const PREVIEW_TOKEN_PARAM: &str = "_storyblok_tk[token]";

/// Per-request lookup key. Built from the URL, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub slug: String,
    pub preview: bool,
    pub preview_token: Option<String>,
}

impl PageRequest {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            preview: false,
            preview_token: None,
        }
    }

    pub fn preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    /// Build from a slug and the raw query pairs of the request.
    ///
    /// Any value of the preview parameter (including an empty one) counts.
    pub fn from_query<'a, I>(slug: impl Into<String>, query: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut req = Self::new(slug);
        for (k, v) in query {
            if k == PREVIEW_PARAM {
                req.preview = true;
            } else if k == PREVIEW_TOKEN_PARAM && !v.is_empty() {
                req.preview_token = Some(v.to_owned());
            }
        }
        req
    }
}

/// Which backend produced the content for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Commerce,
    Cms,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Commerce => "commerce",
            Source::Cms => "cms",
        }
    }
}

/// Result of route resolution. Exactly one variant per request.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedContent {
    Commerce(Page),
    Story(Story),
    NotFound,
}

impl ResolvedContent {
    pub fn source(&self) -> Option<Source> {
        match self {
            ResolvedContent::Commerce(_) => Some(Source::Commerce),
            ResolvedContent::Story(_) => Some(Source::Cms),
            ResolvedContent::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        !matches!(self, ResolvedContent::NotFound)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Metadata
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OpenGraph {
    pub title: Option<String>,
    pub description: Option<String>,
    pub images: Vec<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub published_time: Option<DateTime<Utc>>,
    pub modified_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TwitterCard {
    pub card: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub images: Vec<String>,
}

/// SEO metadata for the document head.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageMetadata {
    pub title: String,
    pub description: Option<String>,
    pub open_graph: Option<OpenGraph>,
    pub twitter: Option<TwitterCard>,
}

impl PageMetadata {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}
