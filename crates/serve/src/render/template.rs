// crates/serve/src/render/template.rs

use super::error::RenderError;
use crate::preview::PreviewBridge;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use domain::{
    commerce::Page, content::PageMetadata, page_type::PageType, setting::SiteSettings,
};
use handlebars::{handlebars_helper, Handlebars};
use serde::Serialize;
use serde_json::json;

const LAYOUT: &str = "layout";
const COMMERCE_PAGE: &str = "commerce_page";
const BLOG_INDEX: &str = "blog_index";
const MESSAGE: &str = "message";

/// `2024-03-01T00:00:00Z` or `2024-03-01` (CMS date fields, time ignored) as
/// `March 1, 2024`; unparseable input is echoed.
pub fn long_date(raw: &str) -> String {
    let date = DateTime::parse_from_rfc3339(raw)
        .map(|d| d.date_naive())
        .or_else(|_| NaiveDate::parse_from_str(raw.get(..10).unwrap_or(raw), "%Y-%m-%d"));
    match date {
        Ok(d) => d.format("%B %-d, %Y").to_string(),
        Err(_) => raw.to_owned(),
    }
}

handlebars_helper!(long_date_helper: |ts: str| long_date(ts));

/// One page, ready for the document shell.
#[derive(Debug, Clone)]
pub struct PageView<'a> {
    pub metadata: &'a PageMetadata,
    pub page_type: PageType,
    /// Already-rendered HTML for `<body>`.
    pub body: &'a str,
    pub preview: bool,
    /// Fallback `og:image` when the metadata carries none.
    pub social_image: Option<String>,
}

#[derive(Serialize)]
struct Document<'a> {
    site_name: &'a str,
    metadata: &'a PageMetadata,
    body_class: String,
    page_type: &'static str,
    content: &'a str,
    social_image: Option<&'a str>,
    year: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlogEntry {
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub image: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Handlebars templates for the document shell and the non-CMS pages.
///
/// Templates are compiled into the binary and registered once.
pub struct Layout {
    hbs: Handlebars<'static>,
    site: SiteSettings,
    bridge: PreviewBridge,
}

impl Layout {
    pub fn new(site: SiteSettings, bridge: PreviewBridge) -> Result<Self, RenderError> {
        let mut hbs = Handlebars::new();
        hbs.register_template_string(LAYOUT, include_str!("../../templates/layout.hbs"))?;
        hbs.register_template_string(
            COMMERCE_PAGE,
            include_str!("../../templates/commerce_page.hbs"),
        )?;
        hbs.register_template_string(BLOG_INDEX, include_str!("../../templates/blog_index.hbs"))?;
        hbs.register_template_string(MESSAGE, include_str!("../../templates/message.hbs"))?;
        hbs.register_helper("long_date", Box::new(long_date_helper));

        Ok(Self { hbs, site, bridge })
    }

    pub fn site(&self) -> &SiteSettings {
        &self.site
    }

    /// Full HTML document; the preview bridge is injected for preview views.
    pub fn page(&self, view: &PageView<'_>) -> Result<String, RenderError> {
        let social_image = if view
            .metadata
            .open_graph
            .as_ref()
            .is_some_and(|og| !og.images.is_empty())
        {
            None
        } else {
            view.social_image.as_deref()
        };

        let doc = Document {
            site_name: &self.site.name,
            metadata: view.metadata,
            body_class: view.page_type.css_classes(),
            page_type: view.page_type.as_str(),
            content: view.body,
            social_image,
            year: Utc::now().year(),
        };
        let html = self.hbs.render(LAYOUT, &doc)?;

        if view.preview {
            self.bridge.inject(&html)
        } else {
            Ok(html)
        }
    }

    /// Body for a commerce page: title, body HTML and last-updated line.
    pub fn commerce_page(&self, page: &Page) -> Result<String, RenderError> {
        Ok(self.hbs.render(COMMERCE_PAGE, &json!({ "page": page }))?)
    }

    pub fn blog_index(
        &self,
        posts: &[BlogEntry],
        next_page: Option<u32>,
    ) -> Result<String, RenderError> {
        Ok(self.hbs.render(
            BLOG_INDEX,
            &json!({ "posts": posts, "next_page": next_page }),
        )?)
    }

    /// Body for the not-found and error pages.
    pub fn message(&self, title: &str, message: &str) -> Result<String, RenderError> {
        Ok(self.hbs.render(
            MESSAGE,
            &json!({ "title": title, "message": message }),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use domain::content::OpenGraph;

    fn layout() -> Layout {
        Layout::new(SiteSettings::default(), PreviewBridge::new("//bridge.js", "tok")).unwrap()
    }

    #[test]
    fn long_dates_accept_timestamps_and_plain_dates() {
        assert_eq!(long_date("2024-03-01T00:00:00Z"), "March 1, 2024");
        assert_eq!(long_date("2024-03-05"), "March 5, 2024");
        assert_eq!(long_date("2024-03-05 10:30"), "March 5, 2024");
        assert_eq!(long_date("soon"), "soon");
    }

    fn page() -> Page {
        Page {
            id: "1".into(),
            handle: "terms".into(),
            title: "Terms & Conditions".into(),
            body: "<p>Be nice.</p>".into(),
            body_summary: String::new(),
            seo: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn commerce_page_escapes_title_and_keeps_body_html() {
        let html = layout().commerce_page(&page()).unwrap();
        assert!(html.contains("Terms &amp; Conditions"));
        assert!(html.contains("<p>Be nice.</p>"));
        assert!(html.contains("This document was last updated on March 1, 2024."));
    }

    #[test]
    fn document_carries_metadata_and_page_type() {
        let metadata = PageMetadata {
            title: "About <us>".into(),
            description: Some("Who we are".into()),
            open_graph: Some(OpenGraph {
                title: Some("About".into()),
                kind: Some("website".into()),
                ..OpenGraph::default()
            }),
            twitter: None,
        };
        let html = layout()
            .page(&PageView {
                metadata: &metadata,
                page_type: PageType::Marketing,
                body: "<main>hi</main>",
                preview: false,
                social_image: Some("/about/opengraph-image".into()),
            })
            .unwrap();

        assert!(html.contains("<title>About &lt;us&gt;</title>"));
        assert!(html.contains(r#"<meta name="description" content="Who we are" />"#));
        assert!(html.contains(r#"<meta property="og:type" content="website" />"#));
        assert!(html.contains(r#"content="/about/opengraph-image""#));
        assert!(html.contains(r#"class="page-marketing seo-high""#));
        assert!(html.contains("<main>hi</main>"));
        assert!(!html.contains("data-preview-bridge"));
    }

    #[test]
    fn preview_pages_get_the_bridge() {
        let metadata = PageMetadata::titled("Draft");
        let html = layout()
            .page(&PageView {
                metadata: &metadata,
                page_type: PageType::Content,
                body: "",
                preview: true,
                social_image: None,
            })
            .unwrap();
        assert!(html.contains("data-preview-bridge"));
    }

    #[test]
    fn empty_blog_index_says_so() {
        let html = layout().blog_index(&[], None).unwrap();
        assert!(html.contains("No posts yet."));
    }
}
