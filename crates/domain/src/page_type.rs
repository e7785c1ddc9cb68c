// crates/domain/src/page_type.rs

//! Slug-based page classification used for cache lifetimes and body classes.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    Legal,
    Marketing,
    Content,
    Landing,
    Ecommerce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeoImportance {
    High,
    Medium,
    Low,
}

impl SeoImportance {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeoImportance::High => "high",
            SeoImportance::Medium => "medium",
            SeoImportance::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTypeConfig {
    pub analytics_category: &'static str,
    pub default_cache_seconds: u32,
    pub seo_importance: SeoImportance,
}

const LEGAL_PAGES: &[&str] = &[
    "privacy-policy",
    "privacy",
    "terms-of-service",
    "terms",
    "terms-and-conditions",
    "cookie-policy",
    "cookies",
    "shipping-policy",
    "shipping",
    "returns-policy",
    "returns",
    "refund-policy",
    "refunds",
    "shipping-returns",
    "accessibility-statement",
    "accessibility",
    "gdpr",
    "data-protection",
];

const MARKETING_PAGES: &[&str] = &[
    "about",
    "about-us",
    "our-story",
    "story",
    "team",
    "mission",
    "values",
    "contact",
    "contact-us",
    "why-choose-us",
    "why-us",
    "our-process",
    "process",
    "testimonials",
    "reviews",
    "careers",
    "jobs",
    "press",
    "media",
];

const CONTENT_PAGES: &[&str] = &[
    "blog",
    "news",
    "guides",
    "help",
    "faq",
    "support",
    "size-guide",
    "sizing",
    "care-instructions",
    "how-to",
    "tutorials",
    "resources",
];

impl PageType {
    /// Classify a slug. Landing checks run first; anything unmatched is content.
    pub fn classify(slug: &str) -> Self {
        let lower = slug.to_ascii_lowercase();
        let slug = lower.trim_matches('/');

        let is_or_ends_with =
            |name: &&str| slug == *name || slug.ends_with(&format!("/{name}"));

        if slug.starts_with("landing/")
            || slug.starts_with("campaign/")
            || slug.contains("sale")
            || slug.contains("offer")
            || slug.contains("promo")
        {
            PageType::Landing
        } else if LEGAL_PAGES.iter().any(is_or_ends_with) {
            PageType::Legal
        } else if MARKETING_PAGES.iter().any(is_or_ends_with) {
            PageType::Marketing
        } else {
            // CONTENT_PAGES prefixes and every unmatched slug land here.
            PageType::Content
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PageType::Legal => "legal",
            PageType::Marketing => "marketing",
            PageType::Content => "content",
            PageType::Landing => "landing",
            PageType::Ecommerce => "ecommerce",
        }
    }

    pub fn config(&self) -> PageTypeConfig {
        match self {
            PageType::Legal => PageTypeConfig {
                analytics_category: "Legal Pages",
                default_cache_seconds: 86_400,
                seo_importance: SeoImportance::Medium,
            },
            PageType::Marketing => PageTypeConfig {
                analytics_category: "Marketing Pages",
                default_cache_seconds: 3_600,
                seo_importance: SeoImportance::High,
            },
            PageType::Content => PageTypeConfig {
                analytics_category: "Content Pages",
                default_cache_seconds: 3_600,
                seo_importance: SeoImportance::Medium,
            },
            PageType::Landing => PageTypeConfig {
                analytics_category: "Landing Pages",
                default_cache_seconds: 1_800,
                seo_importance: SeoImportance::High,
            },
            PageType::Ecommerce => PageTypeConfig {
                analytics_category: "E-commerce Pages",
                default_cache_seconds: 900,
                seo_importance: SeoImportance::High,
            },
        }
    }

    /// Body classes, e.g. `page-legal seo-medium`.
    pub fn css_classes(&self) -> String {
        format!(
            "page-{} seo-{}",
            self.as_str(),
            self.config().seo_importance.as_str()
        )
    }

    /// Whether the page is a content page by prefix (blog, guides, ...).
    pub fn is_editorial(slug: &str) -> bool {
        let lower = slug.to_ascii_lowercase();
        let slug = lower.trim_matches('/');
        CONTENT_PAGES.iter().any(|p| slug.starts_with(p))
    }
}
