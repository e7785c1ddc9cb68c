// crates/adapt/src/storyblok.rs

//! Story backend over the Storyblok content delivery API.

use async_trait::async_trait;
use chrono::Utc;
use domain::{
    cms::{Story, StoryPage, StoryQuery, Version},
    setting::{CmsRegion, CmsSettings},
};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value as Json;
use serve::backend::{BackendError, StoryBackend};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

/// Block fields holding story references that are inlined on fetch.
pub const RESOLVE_RELATIONS: &[&str] = &["product_spotlight.product_handle", "product_grid.products"];

#[derive(Debug, Error)]
pub enum StoryblokError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid story slug: {0}")]
    Slug(String),
}

impl From<StoryblokError> for BackendError {
    fn from(err: StoryblokError) -> Self {
        match err {
            StoryblokError::Http(e) => BackendError::Transport(e.to_string()),
            StoryblokError::Status { status, body } => BackendError::Status {
                status,
                message: body,
            },
            StoryblokError::Json(e) => BackendError::Decode(e.to_string()),
            StoryblokError::Url(e) => BackendError::Transport(e.to_string()),
            StoryblokError::Slug(slug) => BackendError::Api(format!("invalid story slug: {slug}")),
        }
    }
}

pub fn base_url(region: CmsRegion) -> &'static str {
    match region {
        CmsRegion::Eu => "https://api.storyblok.com/",
        CmsRegion::Us => "https://api-us.storyblok.com/",
        CmsRegion::Ap => "https://api-ap.storyblok.com/",
        CmsRegion::Ca => "https://api-ca.storyblok.com/",
    }
}

/// A slug may only name stories: no empty, dot or dot-dot segments and no
/// characters that would end the path.
pub fn is_story_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.split('/').all(|segment| {
            !segment.is_empty()
                && segment != "."
                && segment != ".."
                && !segment.contains(['?', '#', '\\'])
        })
}

/// Query parameters shared by single-story and listing requests. `cv` busts
/// the CDN cache and is only sent for drafts.
fn common_params(token: &str, version: Version, now_ms: i64) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("token", token.to_owned()),
        ("version", version.as_str().to_owned()),
    ];
    if version == Version::Draft {
        params.push(("cv", now_ms.to_string()));
    }
    params
}

#[derive(Debug, Deserialize)]
struct StoryEnvelope {
    story: Story,
    #[serde(default)]
    rels: Vec<Story>,
}

#[derive(Debug, Deserialize)]
struct StoriesEnvelope {
    stories: Vec<Story>,
}

/// Replace relation uuids inside `story.content` with the related stories.
///
/// Only the fields named in [`RESOLVE_RELATIONS`] are touched; unknown uuids
/// stay as they are.
pub fn inline_relations(story: &mut Story, rels: &[Story]) -> Result<(), serde_json::Error> {
    if rels.is_empty() {
        return Ok(());
    }
    let by_uuid = rels
        .iter()
        .filter(|r| !r.uuid.is_empty())
        .map(|r| Ok((r.uuid.as_str(), serde_json::to_value(r)?)))
        .collect::<Result<HashMap<_, _>, serde_json::Error>>()?;

    let mut content = serde_json::to_value(&story.content)?;
    inline_value(&mut content, &by_uuid);
    story.content = serde_json::from_value(content)?;
    Ok(())
}

/// Children first, so inlined stories are never walked again.
fn inline_value(value: &mut Json, rels: &HashMap<&str, Json>) {
    match value {
        Json::Array(items) => items.iter_mut().for_each(|v| inline_value(v, rels)),
        Json::Object(map) => {
            map.values_mut().for_each(|v| inline_value(v, rels));

            let Some(component) = map.get("component").and_then(Json::as_str) else {
                return;
            };
            let fields: Vec<&'static str> = RESOLVE_RELATIONS
                .iter()
                .copied()
                .filter_map(|path| path.split_once('.'))
                .filter(|(c, _)| *c == component)
                .map(|(_, field)| field)
                .collect();
            for field in fields {
                if let Some(slot) = map.get_mut(field) {
                    resolve_slot(slot, rels);
                }
            }
        }
        _ => {}
    }
}

fn resolve_slot(slot: &mut Json, rels: &HashMap<&str, Json>) {
    match slot {
        Json::String(uuid) => {
            if let Some(rel) = rels.get(uuid.as_str()) {
                *slot = rel.clone();
            }
        }
        Json::Array(items) => {
            for item in items {
                if let Json::String(uuid) = item {
                    if let Some(rel) = rels.get(uuid.as_str()) {
                        *item = rel.clone();
                    }
                }
            }
        }
        _ => {}
    }
}

pub struct StoryblokClient {
    http: reqwest::Client,
    base: Url,
    token: SecretString,
}

impl StoryblokClient {
    pub fn new(settings: &CmsSettings) -> Result<Self, StoryblokError> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            base: Url::parse(base_url(settings.region))?,
            token: settings.access_token.clone(),
        })
    }

    fn story_url(&self, slug: &str) -> Result<Url, StoryblokError> {
        let slug = slug.trim_matches('/');
        if !is_story_slug(slug) {
            return Err(StoryblokError::Slug(slug.to_owned()));
        }
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| StoryblokError::Slug(slug.to_owned()))?
            .pop_if_empty()
            .extend(["v2", "cdn", "stories"])
            .extend(slug.split('/'));
        Ok(url)
    }

    async fn fetch_story(&self, slug: &str, version: Version) -> Result<Option<Story>, StoryblokError> {
        if !is_story_slug(slug.trim_matches('/')) {
            debug!(slug, "not a story slug");
            return Ok(None);
        }
        let mut params = common_params(
            self.token.expose_secret(),
            version,
            Utc::now().timestamp_millis(),
        );
        params.push(("resolve_relations", RESOLVE_RELATIONS.join(",")));

        let response = self
            .http
            .get(self.story_url(slug)?)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let text = response.text().await?;
        if !status.is_success() {
            return Err(StoryblokError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let StoryEnvelope { mut story, rels } = serde_json::from_str(&text)?;
        inline_relations(&mut story, &rels)?;
        Ok(Some(story))
    }

    async fn fetch_stories(&self, query: &StoryQuery) -> Result<StoryPage, StoryblokError> {
        let mut params = common_params(
            self.token.expose_secret(),
            query.version,
            Utc::now().timestamp_millis(),
        );
        params.extend([
            ("starts_with", query.starts_with.clone()),
            ("per_page", query.per_page.to_string()),
            ("page", query.page.to_string()),
            ("sort_by", "created_at:desc".to_owned()),
        ]);

        let response = self
            .http
            .get(self.base.join("v2/cdn/stories")?)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
        };
        let total = header("total");
        let per_page = header("per-page").and_then(|n| u32::try_from(n).ok());

        let text = response.text().await?;
        if !status.is_success() {
            return Err(StoryblokError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let StoriesEnvelope { stories } = serde_json::from_str(&text)?;
        Ok(StoryPage {
            total: total.unwrap_or(stories.len() as u64),
            per_page: per_page.unwrap_or(query.per_page),
            stories,
        })
    }
}

#[async_trait]
impl StoryBackend for StoryblokClient {
    #[instrument(skip(self, version), fields(version = version.as_str()))]
    async fn get_story(&self, slug: &str, version: Version) -> Result<Option<Story>, BackendError> {
        Ok(self.fetch_story(slug, version).await?)
    }

    #[instrument(skip_all, fields(starts_with = %query.starts_with, page = query.page))]
    async fn get_stories(&self, query: StoryQuery) -> Result<StoryPage, BackendError> {
        Ok(self.fetch_stories(&query).await?)
    }
}
