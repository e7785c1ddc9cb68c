// crates/serve/src/metadata.rs

//! Head metadata derived from whichever source resolved a page.

use domain::{
    cms::{Asset, Story, StorySeo},
    commerce::Page,
    content::{OpenGraph, PageMetadata, TwitterCard},
    setting::SiteSettings,
};

pub const NOT_FOUND_TITLE: &str = "Page Not Found";
pub const ERROR_TITLE: &str = "Something went wrong";

fn non_blank(s: Option<&str>) -> Option<String> {
    s.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

pub fn for_commerce_page(page: &Page) -> PageMetadata {
    let seo = page.seo.as_ref();
    let title = non_blank(seo.and_then(|s| s.title.as_deref()))
        .unwrap_or_else(|| page.title.clone());
    let description = non_blank(seo.and_then(|s| s.description.as_deref()))
        .or_else(|| non_blank(Some(page.body_summary.as_str())));

    PageMetadata {
        title: title.clone(),
        description: description.clone(),
        open_graph: Some(OpenGraph {
            title: Some(title),
            description,
            images: Vec::new(),
            kind: Some("article".to_owned()),
            published_time: Some(page.created_at),
            modified_time: Some(page.updated_at),
        }),
        twitter: None,
    }
}

/// Social fields shared by story and homepage metadata. Each card layers its
/// own fields over the SEO title (then story name) and SEO description; images
/// never cross between cards.
fn social(seo: &StorySeo, story: &Story) -> (OpenGraph, TwitterCard) {
    let title = seo.title.clone().unwrap_or_else(|| story.name.clone());
    let filename = |asset: &Option<Asset>| -> Vec<String> {
        asset
            .iter()
            .filter(|a| !a.filename.is_empty())
            .map(|a| a.filename.clone())
            .collect()
    };

    let twitter = TwitterCard {
        card: "summary_large_image".to_owned(),
        title: Some(seo.twitter_title.clone().unwrap_or_else(|| title.clone())),
        description: seo
            .twitter_description
            .clone()
            .or_else(|| seo.description.clone()),
        images: filename(&seo.twitter_image),
    };

    let og = OpenGraph {
        title: Some(seo.og_title.clone().unwrap_or(title)),
        description: seo.og_description.clone().or_else(|| seo.description.clone()),
        images: filename(&seo.og_image),
        kind: Some("website".to_owned()),
        published_time: None,
        modified_time: None,
    };

    (og, twitter)
}

/// Title: SEO title, then story name. Description: SEO description, then
/// the content excerpt.
pub fn for_story(story: &Story) -> PageMetadata {
    let seo = story.seo();
    let title = seo.title.clone().unwrap_or_else(|| story.name.clone());
    let description = seo
        .description
        .clone()
        .or_else(|| story.excerpt().map(str::to_owned));

    let (mut og, twitter) = social(&seo, story);
    og.published_time = story.published_at;

    PageMetadata {
        title,
        description,
        open_graph: Some(og),
        twitter: Some(twitter),
    }
}

/// Homepage: like a story, but the site settings fill what the story leaves
/// blank.
pub fn for_home(story: &Story, site: &SiteSettings) -> PageMetadata {
    let seo = story.seo();
    let title = seo
        .title
        .clone()
        .or_else(|| non_blank(Some(story.name.as_str())))
        .unwrap_or_else(|| site.name.clone());
    let description = seo
        .description
        .clone()
        .unwrap_or_else(|| site.description.clone());

    let (og, twitter) = social(&seo, story);

    PageMetadata {
        title,
        description: Some(description),
        open_graph: Some(og),
        twitter: Some(twitter),
    }
}

pub fn not_found() -> PageMetadata {
    PageMetadata {
        title: NOT_FOUND_TITLE.to_owned(),
        description: Some("The page you are looking for does not exist.".to_owned()),
        ..PageMetadata::default()
    }
}

pub fn error_page() -> PageMetadata {
    PageMetadata::titled(ERROR_TITLE)
}
