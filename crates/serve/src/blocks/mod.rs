// crates/serve/src/blocks/mod.rs

//! Block renderer registry.
//!
//! CMS block type tags are parsed into [`BlockKind`] once; the registry maps
//! each kind to a renderer. A tag that is not a known kind, or a kind with no
//! registered renderer, renders a diagnostic placeholder. Rendering never
//! fails: renderers degrade to partial or empty output instead.

mod commerce;
mod layout;

use crate::{backend::CommerceBackend, markup};
use async_trait::async_trait;
use domain::cms::Block;
use futures::future::{join_all, BoxFuture};
use std::{collections::HashMap, sync::Arc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Page,
    Hero,
    ProductSpotlight,
    ProductGrid,
    TextBlock,
    CtaSection,
    CollectionShowcase,
    TestimonialGrid,
    Testimonial,
    NewsletterSignup,
    CtaButton,
    Seo,
    FaqSection,
    ImageGallery,
    BlogPost,
}

impl BlockKind {
    pub const ALL: [BlockKind; 15] = [
        BlockKind::Page,
        BlockKind::Hero,
        BlockKind::ProductSpotlight,
        BlockKind::ProductGrid,
        BlockKind::TextBlock,
        BlockKind::CtaSection,
        BlockKind::CollectionShowcase,
        BlockKind::TestimonialGrid,
        BlockKind::Testimonial,
        BlockKind::NewsletterSignup,
        BlockKind::CtaButton,
        BlockKind::Seo,
        BlockKind::FaqSection,
        BlockKind::ImageGallery,
        BlockKind::BlogPost,
    ];

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tag() == tag)
    }

    pub fn tag(&self) -> &'static str {
        match self {
            BlockKind::Page => "page",
            BlockKind::Hero => "hero",
            BlockKind::ProductSpotlight => "product_spotlight",
            BlockKind::ProductGrid => "product_grid",
            BlockKind::TextBlock => "text_block",
            BlockKind::CtaSection => "cta_section",
            BlockKind::CollectionShowcase => "collection_showcase",
            BlockKind::TestimonialGrid => "testimonial_grid",
            BlockKind::Testimonial => "testimonial",
            BlockKind::NewsletterSignup => "newsletter_signup",
            BlockKind::CtaButton => "cta_button",
            BlockKind::Seo => "seo",
            BlockKind::FaqSection => "faq_section",
            BlockKind::ImageGallery => "image_gallery",
            BlockKind::BlogPost => "blog_post",
        }
    }
}

/// Renders one kind of block to an HTML fragment.
///
/// Renderers that need catalog data fetch it through `ctx.commerce`; nested
/// blocks go back through `ctx.render`/`ctx.render_all`.
#[async_trait]
pub trait BlockRenderer: Send + Sync {
    async fn render(&self, block: &Block, ctx: &RenderContext<'_>) -> String;
}

/// Adaptor for renderers that are a pure function of the block attributes.
pub struct Pure(pub fn(&Block) -> String);

#[async_trait]
impl BlockRenderer for Pure {
    async fn render(&self, block: &Block, _ctx: &RenderContext<'_>) -> String {
        (self.0)(block)
    }
}

/// Everything a renderer may consult while rendering one request.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub registry: &'a Registry,
    pub commerce: &'a dyn CommerceBackend,
    pub preview: bool,
}

impl<'a> RenderContext<'a> {
    pub fn new(registry: &'a Registry, commerce: &'a dyn CommerceBackend) -> Self {
        Self {
            registry,
            commerce,
            preview: false,
        }
    }

    pub fn preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    pub fn render<'b>(&'b self, block: &'b Block) -> BoxFuture<'b, String> {
        self.registry.render(block, self)
    }

    /// Render siblings concurrently; output keeps the input order.
    pub async fn render_all(&self, blocks: &[Block]) -> String {
        join_all(blocks.iter().map(|b| self.render(b)))
            .await
            .concat()
    }
}

#[derive(Clone, Default)]
pub struct Registry {
    renderers: HashMap<BlockKind, Arc<dyn BlockRenderer>>,
}

impl Registry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with a renderer for every known block kind.
    pub fn standard() -> Self {
        let mut reg = Self::empty();
        reg.register(BlockKind::Page, Arc::new(layout::PageRenderer));
        reg.register(BlockKind::Hero, Arc::new(Pure(layout::hero)));
        reg.register(BlockKind::TextBlock, Arc::new(Pure(layout::text_block)));
        reg.register(BlockKind::CtaSection, Arc::new(Pure(layout::cta_section)));
        reg.register(BlockKind::CtaButton, Arc::new(Pure(layout::cta_button)));
        reg.register(
            BlockKind::TestimonialGrid,
            Arc::new(Pure(layout::testimonial_grid)),
        );
        reg.register(BlockKind::Testimonial, Arc::new(Pure(layout::testimonial)));
        reg.register(
            BlockKind::NewsletterSignup,
            Arc::new(Pure(layout::newsletter_signup)),
        );
        reg.register(BlockKind::Seo, Arc::new(Pure(layout::seo)));
        reg.register(BlockKind::FaqSection, Arc::new(Pure(layout::faq_section)));
        reg.register(BlockKind::ImageGallery, Arc::new(Pure(layout::image_gallery)));
        reg.register(
            BlockKind::ProductSpotlight,
            Arc::new(commerce::ProductSpotlight),
        );
        reg.register(BlockKind::ProductGrid, Arc::new(commerce::ProductGrid));
        reg.register(
            BlockKind::CollectionShowcase,
            Arc::new(commerce::CollectionShowcase),
        );
        reg.register(BlockKind::BlogPost, Arc::new(commerce::BlogPost));
        reg
    }

    pub fn register(&mut self, kind: BlockKind, renderer: Arc<dyn BlockRenderer>) -> &mut Self {
        self.renderers.insert(kind, renderer);
        self
    }

    pub fn render<'b>(&'b self, block: &'b Block, ctx: &'b RenderContext<'_>) -> BoxFuture<'b, String> {
        let renderer = BlockKind::from_tag(&block.component).and_then(|k| self.renderers.get(&k));
        match renderer {
            Some(renderer) => renderer.render(block, ctx),
            None => {
                tracing::warn!(component = %block.component, uid = %block.uid, "unregistered block");
                let html = placeholder(block);
                Box::pin(async move { html })
            }
        }
    }
}

/// Development aid shown in place of a block nothing knows how to render.
pub fn placeholder(block: &Block) -> String {
    let payload =
        serde_json::to_string_pretty(&block.to_json()).unwrap_or_else(|_| "{}".to_owned());
    format!(
        concat!(
            r#"<div class="border-2 border-red-500 bg-red-50 p-4 m-4"{}>"#,
            r#"<h3 class="text-red-700 font-bold">Unregistered Component: {}</h3>"#,
            r#"<details class="mt-2"><summary class="cursor-pointer text-red-600">View component data</summary>"#,
            r#"<pre class="mt-2 text-xs bg-white p-2 border rounded overflow-auto">{}</pre>"#,
            "</details></div>"
        ),
        markup::editable(block),
        markup::text(&block.component),
        markup::text(&payload),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockCommerceBackend;
    use serde_json::json;
    use std::time::Duration;

    /// Sleeps longer for earlier siblings so completion order is reversed.
    struct Slow;

    #[async_trait]
    impl BlockRenderer for Slow {
        async fn render(&self, block: &Block, _ctx: &RenderContext<'_>) -> String {
            let delay = block.number("delay").unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            format!("[{}]", block.uid)
        }
    }

    fn page(body: serde_json::Value) -> Block {
        serde_json::from_value(json!({
            "_uid": "root",
            "component": "page",
            "body": body,
        }))
        .unwrap()
    }

    #[test]
    fn tags_round_trip_through_kinds() {
        for kind in BlockKind::ALL {
            assert_eq!(BlockKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(BlockKind::from_tag("carousel"), None);
    }

    #[test]
    fn standard_registry_covers_every_kind() {
        let reg = Registry::standard();
        assert!(BlockKind::ALL.iter().all(|k| reg.renderers.contains_key(k)));
    }

    #[tokio::test]
    async fn unknown_tag_renders_placeholder_and_siblings_still_render() {
        let registry = Registry::standard();
        let commerce = MockCommerceBackend::new();
        let ctx = RenderContext::new(&registry, &commerce);

        let root = page(json!([
            {"_uid": "a", "component": "text_block", "content": "first"},
            {"_uid": "b", "component": "mystery_widget", "secret": "<x>"},
            {"_uid": "c", "component": "text_block", "content": "last"}
        ]));

        let html = ctx.render(&root).await;
        let first = html.find("first").unwrap();
        let placeholder = html.find("Unregistered Component: mystery_widget").unwrap();
        let last = html.find("last").unwrap();
        assert!(first < placeholder && placeholder < last);
        assert!(html.contains("&lt;x&gt;"));
    }

    #[tokio::test]
    async fn known_kind_without_renderer_renders_placeholder() {
        let registry = Registry::empty();
        let commerce = MockCommerceBackend::new();
        let ctx = RenderContext::new(&registry, &commerce);

        let html = ctx.render(&Block::new("h", "hero")).await;
        assert!(html.contains("Unregistered Component: hero"));
    }

    #[tokio::test]
    async fn siblings_keep_child_order_regardless_of_completion() {
        let mut registry = Registry::standard();
        registry.register(BlockKind::Hero, Arc::new(Slow));
        let commerce = MockCommerceBackend::new();
        let ctx = RenderContext::new(&registry, &commerce);

        let children = vec![
            Block::new("1", "hero").with("delay", 30),
            Block::new("2", "hero").with("delay", 10),
            Block::new("3", "hero").with("delay", 0),
        ];
        assert_eq!(ctx.render_all(&children).await, "[1][2][3]");
    }
}
