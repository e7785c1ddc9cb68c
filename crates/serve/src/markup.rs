// crates/serve/src/markup.rs

//! Small HTML building helpers shared by the block renderers.

use domain::{cms::Block, commerce::Money};
use html_escape::{encode_double_quoted_attribute, encode_text};

/// Escape text content.
pub fn text(s: &str) -> String {
    encode_text(s).into_owned()
}

/// Escape a double-quoted attribute value.
pub fn attr(s: &str) -> String {
    encode_double_quoted_attribute(s).into_owned()
}

/// Escape a URL for an `href`/`src` attribute; script URLs become `#`.
pub fn url(s: &str) -> String {
    let trimmed = s.trim();
    let scheme = trimmed
        .split(':')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    if trimmed.contains(':') && matches!(scheme.trim(), "javascript" | "vbscript" | "data") {
        return "#".to_owned();
    }
    attr(trimmed)
}

/// Editor annotation for a block, taken from the CMS `_editable` comment.
///
/// The CMS delivers `<!--#storyblok#{json}-->`; the visual editor expects the
/// JSON in `data-blok-c` and the uid in `data-blok-uid`.
pub fn editable(block: &Block) -> String {
    let Some(raw) = block.text("_editable") else {
        return String::new();
    };
    let Some(json) = raw
        .strip_prefix("<!--#storyblok#")
        .and_then(|s| s.strip_suffix("-->"))
    else {
        return String::new();
    };
    let uid = serde_json::from_str::<serde_json::Value>(json)
        .ok()
        .and_then(|v| {
            let id = v.get("id")?.as_str()?.to_owned();
            let uid = v.get("uid")?.as_str()?.to_owned();
            Some(format!("{id}-{uid}"))
        })
        .unwrap_or_default();

    format!(r#" data-blok-c="{}" data-blok-uid="{}""#, attr(json), attr(&uid))
}

/// `bg-{color}` when the editor picked one, else the block's default.
pub fn background(block: &Block, default: &str) -> String {
    match block.text("background_color") {
        Some(c) => {
            let c: String = c
                .chars()
                .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '-')
                .collect();
            if c.is_empty() {
                default.to_owned()
            } else {
                format!("bg-{c}")
            }
        }
        None => default.to_owned(),
    }
}

/// Look a variant up in a static table, falling back to `default` when the
/// attribute is absent or unrecognised.
pub fn variant(
    block: &Block,
    key: &str,
    table: &[(&str, &'static str)],
    default: &str,
) -> &'static str {
    let chosen = block.text(key).map(str::to_owned).or_else(|| {
        // number fields arrive as JSON numbers from some editors
        block.number(key).map(|n| n.to_string())
    });

    let lookup = |name: &str| {
        table
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, class)| *class)
    };

    chosen
        .as_deref()
        .and_then(lookup)
        .or_else(|| lookup(default))
        .unwrap_or_default()
}

/// Opacity as a CSS fraction; a missing or zero value means half.
pub fn opacity(block: &Block) -> String {
    let pct = block.number("overlay_opacity").filter(|n| *n > 0).unwrap_or(50).min(100);
    format!("{:.2}", pct as f64 / 100.0)
}

pub fn money(price: &Money) -> String {
    let amount = price
        .amount
        .parse::<f64>()
        .map(|a| format!("{a:.2}"))
        .unwrap_or_else(|_| price.amount.clone());
    let symbol = match price.currency_code.as_str() {
        "USD" | "CAD" | "AUD" | "NZD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        _ => "",
    };
    text(&format!("{symbol}{amount} {}", price.currency_code))
}

/// Strip tags from commerce HTML for short plain-text excerpts.
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZES: &[(&str, &str)] = &[("small", "h-96"), ("medium", "h-[32rem]")];

    #[test]
    fn variants_default_when_unknown_or_absent() {
        let block = Block::new("1", "hero").with("height", "gigantic");
        assert_eq!(variant(&block, "height", SIZES, "medium"), "h-[32rem]");

        let block = Block::new("1", "hero").with("height", "small");
        assert_eq!(variant(&block, "height", SIZES, "medium"), "h-96");

        let block = Block::new("1", "hero");
        assert_eq!(variant(&block, "height", SIZES, "medium"), "h-[32rem]");
    }

    #[test]
    fn numeric_variants_accept_numbers() {
        let cols: &[(&str, &str)] = &[("2", "two"), ("4", "four")];
        let block = Block::new("1", "grid").with("columns", 2);
        assert_eq!(variant(&block, "columns", cols, "4"), "two");
    }

    #[test]
    fn background_is_sanitised() {
        let block = Block::new("1", "x").with("background_color", "gray-50\" onclick=\"x");
        assert_eq!(background(&block, "bg-white"), "bg-gray-50onclickx");
        assert_eq!(background(&Block::new("1", "x"), "bg-white"), "bg-white");
    }

    #[test]
    fn script_urls_are_neutralised() {
        assert_eq!(url("javascript:alert(1)"), "#");
        assert_eq!(url(" JavaScript:alert(1)"), "#");
        assert_eq!(url("/search/shirts"), "/search/shirts");
        assert_eq!(url("https://a.test/?q=\"x\""), "https://a.test/?q=&quot;x&quot;");
    }

    #[test]
    fn money_formats_symbol_and_code() {
        let price = Money {
            amount: "19.5".into(),
            currency_code: "USD".into(),
        };
        assert_eq!(money(&price), "$19.50 USD");
    }

    #[test]
    fn editable_reads_cms_comment() {
        let block = Block::new("u1", "hero").with(
            "_editable",
            r#"<!--#storyblok#{"name": "hero", "space": "1", "uid": "u1", "id": "42"}-->"#,
        );
        let out = editable(&block);
        assert!(out.contains(r#"data-blok-uid="42-u1""#));
        assert!(out.contains("data-blok-c=\"{&quot;name&quot;"));

        assert_eq!(editable(&Block::new("u1", "hero")), "");
    }
}
