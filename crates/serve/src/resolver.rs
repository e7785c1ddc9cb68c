// crates/serve/src/resolver.rs

//! Route resolution: which source owns a slug, and what the page looks like.
//!
//! Sources are tried in a fixed order (commerce first). Each attempt reports
//! `Found`, `Absent` or `Failed`; the fallback policy decides whether a
//! failure falls through to the next source or ends the request.

use crate::{
    backend::{BackendError, CommerceBackend, StoryBackend},
    blocks::{Registry, RenderContext},
    metadata,
    render::{BlogEntry, Layout, PageView},
    Error,
};
use async_trait::async_trait;
use domain::{
    cms::{Story, StoryQuery, Version},
    content::{PageMetadata, PageRequest, ResolvedContent, Source},
    page_type::PageType,
    setting::FallbackPolicy,
};
use http::StatusCode;
use std::sync::Arc;
use tracing::instrument;

pub const HOME_SLUG: &str = "home";
pub const BLOG_PREFIX: &str = "blog/";

/// Outcome of asking one source for a slug.
#[derive(Debug)]
pub enum Attempt {
    Found(ResolvedContent),
    Absent,
    Failed(BackendError),
}

impl From<Result<Option<ResolvedContent>, BackendError>> for Attempt {
    fn from(result: Result<Option<ResolvedContent>, BackendError>) -> Self {
        match result {
            Ok(Some(found)) => Attempt::Found(found),
            Ok(None) => Attempt::Absent,
            Err(error) => Attempt::Failed(error),
        }
    }
}

#[async_trait]
pub trait ResolveAttempt: Send + Sync {
    fn source(&self) -> Source;

    async fn attempt(&self, request: &PageRequest) -> Attempt;
}

pub struct CommerceAttempt {
    commerce: Arc<dyn CommerceBackend>,
}

impl CommerceAttempt {
    pub fn new(commerce: Arc<dyn CommerceBackend>) -> Self {
        Self { commerce }
    }
}

#[async_trait]
impl ResolveAttempt for CommerceAttempt {
    fn source(&self) -> Source {
        Source::Commerce
    }

    async fn attempt(&self, request: &PageRequest) -> Attempt {
        self.commerce
            .get_page(&request.slug)
            .await
            .map(|page| page.map(ResolvedContent::Commerce))
            .into()
    }
}

pub struct StoryAttempt {
    stories: Arc<dyn StoryBackend>,
}

impl StoryAttempt {
    pub fn new(stories: Arc<dyn StoryBackend>) -> Self {
        Self { stories }
    }
}

#[async_trait]
impl ResolveAttempt for StoryAttempt {
    fn source(&self) -> Source {
        Source::Cms
    }

    async fn attempt(&self, request: &PageRequest) -> Attempt {
        let version = Version::for_preview(request.preview);
        self.stories
            .get_story(&request.slug, version)
            .await
            .map(|story| story.map(ResolvedContent::Story))
            .into()
    }
}

/// A resolved page: content plus everything the document shell needs.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub slug: String,
    pub content: ResolvedContent,
    pub metadata: PageMetadata,
    pub body: String,
    pub page_type: PageType,
    pub preview: bool,
    pub status: StatusCode,
}

impl Resolution {
    pub fn view(&self) -> PageView<'_> {
        let social_image = (!self.slug.is_empty() && self.content.is_found())
            .then(|| format!("/{}/opengraph-image", self.slug));
        PageView {
            metadata: &self.metadata,
            page_type: self.page_type,
            body: &self.body,
            preview: self.preview,
            social_image,
        }
    }
}

pub fn log_page_error(origin: Source, slug: &str, error: &BackendError) {
    tracing::error!(source = origin.as_str(), slug, %error, "page lookup failed");
}

pub struct RouteResolver {
    attempts: Vec<Box<dyn ResolveAttempt>>,
    commerce: Arc<dyn CommerceBackend>,
    stories: Arc<dyn StoryBackend>,
    registry: Arc<Registry>,
    layout: Arc<Layout>,
    policy: FallbackPolicy,
}

impl RouteResolver {
    /// Commerce first, then the CMS.
    pub fn new(
        commerce: Arc<dyn CommerceBackend>,
        stories: Arc<dyn StoryBackend>,
        registry: Arc<Registry>,
        layout: Arc<Layout>,
        policy: FallbackPolicy,
    ) -> Self {
        let attempts: Vec<Box<dyn ResolveAttempt>> = vec![
            Box::new(CommerceAttempt::new(commerce.clone())),
            Box::new(StoryAttempt::new(stories.clone())),
        ];
        Self {
            attempts,
            commerce,
            stories,
            registry,
            layout,
            policy,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    async fn first_found(&self, request: &PageRequest) -> Result<ResolvedContent, Error> {
        for attempt in &self.attempts {
            match attempt.attempt(request).await {
                Attempt::Found(content) => return Ok(content),
                Attempt::Absent => {}
                Attempt::Failed(error) => {
                    log_page_error(attempt.source(), &request.slug, &error);
                    if self.policy == FallbackPolicy::Strict {
                        return Err(Error::Upstream {
                            origin: attempt.source(),
                            error,
                        });
                    }
                }
            }
        }
        Ok(ResolvedContent::NotFound)
    }

    async fn render_story(&self, story: &Story, preview: bool) -> String {
        let ctx = RenderContext::new(&self.registry, self.commerce.as_ref()).preview(preview);
        ctx.render(&story.content).await
    }

    #[instrument(skip_all, fields(slug = %request.slug, preview = request.preview))]
    pub async fn resolve(&self, request: &PageRequest) -> Result<Resolution, Error> {
        let content = self.first_found(request).await?;
        let page_type = PageType::classify(&request.slug);

        let (metadata, body, status) = match &content {
            ResolvedContent::Commerce(page) => (
                metadata::for_commerce_page(page),
                self.layout.commerce_page(page)?,
                StatusCode::OK,
            ),
            ResolvedContent::Story(story) => (
                metadata::for_story(story),
                self.render_story(story, request.preview).await,
                StatusCode::OK,
            ),
            ResolvedContent::NotFound => (
                metadata::not_found(),
                self.layout.message(
                    metadata::NOT_FOUND_TITLE,
                    "The page you are looking for does not exist.",
                )?,
                StatusCode::NOT_FOUND,
            ),
        };

        Ok(Resolution {
            slug: request.slug.clone(),
            content,
            metadata,
            body,
            page_type,
            preview: request.preview,
            status,
        })
    }

    /// The homepage is the CMS story `home`; without it the generic error
    /// page is served.
    #[instrument(skip_all, fields(preview = preview))]
    pub async fn resolve_home(&self, preview: bool) -> Result<Resolution, Error> {
        let found = self
            .stories
            .get_story(HOME_SLUG, Version::for_preview(preview))
            .await;

        let story = match found {
            Ok(Some(story)) => story,
            Ok(None) => {
                tracing::error!(source = Source::Cms.as_str(), slug = HOME_SLUG, "home story missing");
                return self.error_page(preview);
            }
            Err(error) => {
                log_page_error(Source::Cms, HOME_SLUG, &error);
                if self.policy == FallbackPolicy::Strict {
                    return Err(Error::Upstream {
                        origin: Source::Cms,
                        error,
                    });
                }
                return self.error_page(preview);
            }
        };

        let metadata = metadata::for_home(&story, self.layout.site());
        let body = self.render_story(&story, preview).await;

        Ok(Resolution {
            slug: String::new(),
            content: ResolvedContent::Story(story),
            metadata,
            body,
            page_type: PageType::Marketing,
            preview,
            status: StatusCode::OK,
        })
    }

    fn error_page(&self, preview: bool) -> Result<Resolution, Error> {
        Ok(Resolution {
            slug: String::new(),
            content: ResolvedContent::NotFound,
            metadata: metadata::error_page(),
            body: self.layout.message(
                metadata::ERROR_TITLE,
                "We could not load this page. Please try again later.",
            )?,
            page_type: PageType::Content,
            preview,
            status: StatusCode::INTERNAL_SERVER_ERROR,
        })
    }

    /// Title only, for the social image. Published content, same source order.
    #[instrument(skip_all, fields(slug = %slug))]
    pub async fn resolve_title(&self, slug: &str) -> String {
        let request = PageRequest::new(slug);
        for attempt in &self.attempts {
            match attempt.attempt(&request).await {
                Attempt::Found(ResolvedContent::Commerce(page)) => {
                    return metadata::for_commerce_page(&page).title
                }
                Attempt::Found(ResolvedContent::Story(story)) => {
                    return story.seo().title.unwrap_or(story.name)
                }
                Attempt::Found(ResolvedContent::NotFound) | Attempt::Absent => {}
                Attempt::Failed(error) => log_page_error(attempt.source(), slug, &error),
            }
        }
        metadata::NOT_FOUND_TITLE.to_owned()
    }

    /// One page of stories under `blog/`, newest first.
    #[instrument(skip_all, fields(page = page))]
    pub async fn blog_index(&self, page: u32) -> Result<Resolution, Error> {
        let query = StoryQuery {
            page: page.max(1),
            ..StoryQuery::starting_with(BLOG_PREFIX)
        };
        let listing = match self.stories.get_stories(query).await {
            Ok(listing) => listing,
            Err(error) => {
                log_page_error(Source::Cms, "blog", &error);
                if self.policy == FallbackPolicy::Strict {
                    return Err(Error::Upstream {
                        origin: Source::Cms,
                        error,
                    });
                }
                Default::default()
            }
        };

        let entries: Vec<BlogEntry> = listing
            .stories
            .iter()
            .map(|story| {
                let seo = story.seo();
                BlogEntry {
                    slug: if story.full_slug.is_empty() {
                        format!("{BLOG_PREFIX}{}", story.slug)
                    } else {
                        story.full_slug.clone()
                    },
                    title: story
                        .content
                        .text("title")
                        .map(str::to_owned)
                        .or(seo.title)
                        .unwrap_or_else(|| story.name.clone()),
                    excerpt: story.excerpt().map(str::to_owned).or(seo.description),
                    image: story.content.asset("featured_image").map(|a| a.filename),
                    published_at: story.published_at.or(story.created_at),
                }
            })
            .collect();

        let shown = u64::from(page.max(1)) * u64::from(listing.per_page.max(1));
        let next_page = (shown < listing.total).then(|| page.max(1) + 1);

        let metadata = PageMetadata {
            title: "Blog".to_owned(),
            description: Some(format!("News and stories from {}.", self.layout.site().name)),
            ..PageMetadata::default()
        };

        Ok(Resolution {
            slug: "blog".to_owned(),
            content: ResolvedContent::NotFound,
            metadata,
            body: self.layout.blog_index(&entries, next_page)?,
            page_type: PageType::Content,
            preview: false,
            status: StatusCode::OK,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::{MockCommerceBackend, MockStoryBackend},
        preview::PreviewBridge,
    };
    use chrono::{TimeZone, Utc};
    use domain::{
        cms::{Block, StoryPage},
        commerce::Page,
        setting::SiteSettings,
    };
    use serde_json::json;

    fn commerce_page(handle: &str) -> Page {
        Page {
            id: "gid://shopify/Page/9".into(),
            handle: handle.into(),
            title: "Shipping Policy".into(),
            body: "<p>From the warehouse</p>".into(),
            body_summary: "From the warehouse".into(),
            seo: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
        }
    }

    fn story(slug: &str, name: &str, body: serde_json::Value) -> Story {
        serde_json::from_value(json!({
            "id": 1,
            "name": name,
            "slug": slug,
            "full_slug": slug,
            "content": {"_uid": "root", "component": "page", "body": body}
        }))
        .unwrap()
    }

    fn resolver(
        commerce: MockCommerceBackend,
        stories: MockStoryBackend,
        policy: FallbackPolicy,
    ) -> RouteResolver {
        let layout = Layout::new(SiteSettings::default(), PreviewBridge::new("//b.js", "tok")).unwrap();
        RouteResolver::new(
            Arc::new(commerce),
            Arc::new(stories),
            Arc::new(Registry::standard()),
            Arc::new(layout),
            policy,
        )
    }

    #[tokio::test]
    async fn commerce_wins_when_both_sources_have_the_slug() {
        let mut commerce = MockCommerceBackend::new();
        commerce
            .expect_get_page()
            .returning(|h| Ok(Some(commerce_page(h))));
        let mut stories = MockStoryBackend::new();
        stories.expect_get_story().never();

        let res = resolver(commerce, stories, FallbackPolicy::Lenient)
            .resolve(&PageRequest::new("shipping"))
            .await
            .unwrap();

        assert!(matches!(res.content, ResolvedContent::Commerce(_)));
        assert_eq!(res.metadata.title, "Shipping Policy");
        assert!(res.body.contains("This document was last updated on January 2, 2024."));
        assert_eq!(res.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn story_resolves_when_commerce_is_absent() {
        let mut commerce = MockCommerceBackend::new();
        commerce.expect_get_page().returning(|_| Ok(None));
        let mut stories = MockStoryBackend::new();
        stories
            .expect_get_story()
            .withf(|_, v| *v == Version::Published)
            .returning(|slug, _| {
                Ok(Some(story(
                    slug,
                    "About Us",
                    json!([{"_uid": "t", "component": "text_block", "content": {
                        "type": "doc",
                        "content": [{"type": "paragraph", "content": [{"type": "text", "text": "Hello"}]}]
                    }}]),
                )))
            });

        let res = resolver(commerce, stories, FallbackPolicy::Lenient)
            .resolve(&PageRequest::new("about-us"))
            .await
            .unwrap();

        assert_eq!(res.metadata.title, "About Us");
        assert!(res.body.contains("<p>Hello</p>"));
        assert_eq!(res.page_type, PageType::Marketing);
    }

    #[tokio::test]
    async fn preview_reads_draft_stories() {
        let mut commerce = MockCommerceBackend::new();
        commerce.expect_get_page().returning(|_| Ok(None));
        let mut stories = MockStoryBackend::new();
        stories
            .expect_get_story()
            .withf(|_, v| *v == Version::Draft)
            .times(1)
            .returning(|slug, _| Ok(Some(story(slug, "Draft", json!([])))));

        let res = resolver(commerce, stories, FallbackPolicy::Lenient)
            .resolve(&PageRequest::new("draft").preview(true))
            .await
            .unwrap();
        assert!(res.preview);
        assert!(res.view().preview);
    }

    #[tokio::test]
    async fn neither_source_is_not_found() {
        let mut commerce = MockCommerceBackend::new();
        commerce.expect_get_page().returning(|_| Ok(None));
        let mut stories = MockStoryBackend::new();
        stories.expect_get_story().returning(|_, _| Ok(None));

        let res = resolver(commerce, stories, FallbackPolicy::Lenient)
            .resolve(&PageRequest::new("nowhere"))
            .await
            .unwrap();

        assert_eq!(res.content, ResolvedContent::NotFound);
        assert_eq!(res.metadata.title, "Page Not Found");
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert!(res.view().social_image.is_none());
    }

    #[tokio::test]
    async fn lenient_policy_falls_through_failures() {
        let mut commerce = MockCommerceBackend::new();
        commerce
            .expect_get_page()
            .returning(|_| Err(BackendError::Transport("timeout".into())));
        let mut stories = MockStoryBackend::new();
        stories
            .expect_get_story()
            .returning(|slug, _| Ok(Some(story(slug, "Fallback", json!([])))));

        let res = resolver(commerce, stories, FallbackPolicy::Lenient)
            .resolve(&PageRequest::new("faq"))
            .await
            .unwrap();
        assert_eq!(res.metadata.title, "Fallback");
    }

    #[tokio::test]
    async fn strict_policy_surfaces_failures() {
        let mut commerce = MockCommerceBackend::new();
        commerce
            .expect_get_page()
            .returning(|_| Err(BackendError::Transport("timeout".into())));
        let mut stories = MockStoryBackend::new();
        stories.expect_get_story().never();

        let err = resolver(commerce, stories, FallbackPolicy::Strict)
            .resolve(&PageRequest::new("faq"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Upstream {
                origin: Source::Commerce,
                ..
            }
        ));
        assert_eq!(err.to_status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn missing_home_story_is_an_error_page() {
        let commerce = MockCommerceBackend::new();
        let mut stories = MockStoryBackend::new();
        stories
            .expect_get_story()
            .withf(|slug, _| slug == HOME_SLUG)
            .returning(|_, _| Ok(None));

        let res = resolver(commerce, stories, FallbackPolicy::Lenient)
            .resolve_home(false)
            .await
            .unwrap();
        assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.metadata.title, "Something went wrong");
    }

    #[tokio::test]
    async fn home_story_renders_with_site_fallbacks() {
        let commerce = MockCommerceBackend::new();
        let mut stories = MockStoryBackend::new();
        stories
            .expect_get_story()
            .returning(|_, _| Ok(Some(story("home", "Home", json!([{"_uid": "h", "component": "hero", "headline": "Welcome"}])))));

        let res = resolver(commerce, stories, FallbackPolicy::Lenient)
            .resolve_home(false)
            .await
            .unwrap();
        assert_eq!(res.metadata.title, "Home");
        assert_eq!(
            res.metadata.description.as_deref(),
            Some("Shop premium quality products at Acme Store.")
        );
        assert!(res.body.contains("Welcome"));
    }

    #[tokio::test]
    async fn title_follows_source_order() {
        let mut commerce = MockCommerceBackend::new();
        commerce.expect_get_page().returning(|_| Ok(None));
        let mut stories = MockStoryBackend::new();
        stories.expect_get_story().returning(|slug, _| {
            let mut s = story(slug, "Care Guide", json!([]));
            s.content = Block::new("root", "page").with("seo", json!({"title": "How to care"}));
            Ok(Some(s))
        });

        let title = resolver(commerce, stories, FallbackPolicy::Lenient)
            .resolve_title("care")
            .await;
        assert_eq!(title, "How to care");
    }

    #[tokio::test]
    async fn blog_index_lists_stories_and_paginates() {
        let commerce = MockCommerceBackend::new();
        let mut stories = MockStoryBackend::new();
        stories
            .expect_get_stories()
            .withf(|q| q.starts_with == "blog/" && q.page == 1)
            .returning(|_| {
                Ok(StoryPage {
                    stories: vec![story("blog/first", "First post", json!([]))],
                    total: 12,
                    per_page: 10,
                })
            });

        let res = resolver(commerce, stories, FallbackPolicy::Lenient)
            .blog_index(1)
            .await
            .unwrap();
        assert!(res.body.contains(r#"href="/blog/first""#));
        assert!(res.body.contains("First post"));
        assert!(res.body.contains("/blog?page=2"));
    }
}
