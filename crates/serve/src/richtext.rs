// crates/serve/src/richtext.rs

//! Rich-text documents from the CMS rendered to HTML.
//!
//! The document is a tree of `{type, content, attrs, marks, text}` nodes.
//! Unknown node types render their children so editor additions degrade to
//! plain content instead of disappearing.

use crate::markup;
use serde_json::Value as Json;

/// Render a rich-text field. Plain strings become a single paragraph.
pub fn render(value: &Json) -> String {
    match value {
        Json::String(s) if s.trim().is_empty() => String::new(),
        Json::String(s) => format!("<p>{}</p>", markup::text(s)),
        Json::Object(_) => {
            let mut out = String::new();
            node(value, &mut out);
            out
        }
        _ => String::new(),
    }
}

/// Whether a rich-text field has anything to show.
pub fn is_empty(value: Option<&Json>) -> bool {
    match value {
        None | Some(Json::Null) => true,
        Some(Json::String(s)) => s.trim().is_empty(),
        Some(doc @ Json::Object(_)) => !has_text(doc),
        Some(_) => true,
    }
}

fn has_text(node: &Json) -> bool {
    let kind = node.get("type").and_then(Json::as_str).unwrap_or_default();
    if matches!(kind, "image" | "horizontal_rule") {
        return true;
    }
    if node
        .get("text")
        .and_then(Json::as_str)
        .is_some_and(|t| !t.trim().is_empty())
    {
        return true;
    }
    children(node).iter().any(has_text)
}

fn children(node: &Json) -> &[Json] {
    node.get("content")
        .and_then(Json::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn attr<'a>(node: &'a Json, key: &str) -> Option<&'a Json> {
    node.get("attrs").and_then(|a| a.get(key)).filter(|v| !v.is_null())
}

fn attr_str<'a>(node: &'a Json, key: &str) -> Option<&'a str> {
    attr(node, key).and_then(Json::as_str).filter(|s| !s.is_empty())
}

fn wrap(tag: &str, node: &Json, out: &mut String) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    for child in children(node) {
        self::node(child, out);
    }
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn node(node: &Json, out: &mut String) {
    let kind = node.get("type").and_then(Json::as_str).unwrap_or_default();
    match kind {
        "doc" => {
            for child in children(node) {
                self::node(child, out);
            }
        }
        "paragraph" => wrap("p", node, out),
        "heading" => {
            let level = attr(node, "level")
                .and_then(Json::as_u64)
                .unwrap_or(1)
                .clamp(1, 6);
            wrap(&format!("h{level}"), node, out);
        }
        "bullet_list" => wrap("ul", node, out),
        "ordered_list" => {
            match attr(node, "order").and_then(Json::as_u64) {
                Some(start) if start != 1 => {
                    out.push_str(&format!("<ol start=\"{start}\">"));
                }
                _ => out.push_str("<ol>"),
            }
            for child in children(node) {
                self::node(child, out);
            }
            out.push_str("</ol>");
        }
        "list_item" => wrap("li", node, out),
        "blockquote" => wrap("blockquote", node, out),
        "code_block" => {
            out.push_str("<pre><code");
            if let Some(lang) = attr_str(node, "class") {
                out.push_str(&format!(" class=\"{}\"", markup::attr(lang)));
            }
            out.push('>');
            for child in children(node) {
                self::node(child, out);
            }
            out.push_str("</code></pre>");
        }
        "horizontal_rule" => out.push_str("<hr />"),
        "hard_break" => out.push_str("<br />"),
        "image" => {
            if let Some(src) = attr_str(node, "src") {
                out.push_str(&format!(
                    "<img src=\"{}\" alt=\"{}\"",
                    markup::url(src),
                    markup::attr(attr_str(node, "alt").unwrap_or_default())
                ));
                if let Some(title) = attr_str(node, "title") {
                    out.push_str(&format!(" title=\"{}\"", markup::attr(title)));
                }
                out.push_str(" />");
            }
        }
        "text" => text(node, out),
        _ => {
            for child in children(node) {
                self::node(child, out);
            }
        }
    }
}

fn text(node: &Json, out: &mut String) {
    let body = node
        .get("text")
        .and_then(Json::as_str)
        .map(markup::text)
        .unwrap_or_default();

    let marks = node
        .get("marks")
        .and_then(Json::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut open = String::new();
    let mut close = Vec::new();
    for mark in marks {
        let kind = mark.get("type").and_then(Json::as_str).unwrap_or_default();
        let (start, end) = match kind {
            "bold" => ("<strong>".to_owned(), "</strong>"),
            "italic" => ("<em>".to_owned(), "</em>"),
            "underline" => ("<u>".to_owned(), "</u>"),
            "strike" => ("<s>".to_owned(), "</s>"),
            "code" => ("<code>".to_owned(), "</code>"),
            "superscript" => ("<sup>".to_owned(), "</sup>"),
            "subscript" => ("<sub>".to_owned(), "</sub>"),
            "highlight" => ("<mark>".to_owned(), "</mark>"),
            "link" => (link_open(mark), "</a>"),
            _ => continue,
        };
        open.push_str(&start);
        close.push(end);
    }

    out.push_str(&open);
    out.push_str(&body);
    for end in close.iter().rev() {
        out.push_str(end);
    }
}

fn link_open(mark: &Json) -> String {
    let href = attr_str(mark, "href").unwrap_or("#");
    let href = match (attr_str(mark, "linktype"), attr_str(mark, "anchor")) {
        (Some("email"), _) if !href.starts_with("mailto:") => format!("mailto:{href}"),
        (_, Some(anchor)) => format!("{href}#{anchor}"),
        _ => href.to_owned(),
    };

    let mut tag = format!("<a href=\"{}\"", markup::url(&href));
    if let Some(target) = attr_str(mark, "target") {
        tag.push_str(&format!(" target=\"{}\"", markup::attr(target)));
        if target == "_blank" {
            tag.push_str(" rel=\"noopener noreferrer\"");
        }
    }
    tag.push('>');
    tag
}
