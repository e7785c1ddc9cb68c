// crates/serve/src/render/html_rewriter.rs

use super::error::RenderError;
use lol_html::{element, html_content::ContentType, rewrite_str, Settings};

/// Append raw HTML as the last child of `<head>`.
///
/// Documents without a head are returned unchanged.
pub fn append_to_head(html: &str, fragment: &str) -> Result<String, RenderError> {
    let settings = Settings {
        element_content_handlers: vec![element!("head", |el| {
            el.append(fragment, ContentType::Html);
            Ok(())
        })],
        ..Settings::default()
    };

    rewrite_str(html, settings).map_err(|e| RenderError::LolHtml(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_before_closing_head() {
        let out = append_to_head("<head><meta charset=\"utf-8\"></head>", "<x-y></x-y>").unwrap();
        assert_eq!(out, "<head><meta charset=\"utf-8\"><x-y></x-y></head>");
    }

    #[test]
    fn no_head_no_change() {
        let out = append_to_head("<p>fragment</p>", "<x-y></x-y>").unwrap();
        assert_eq!(out, "<p>fragment</p>");
    }
}
