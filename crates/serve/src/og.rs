// crates/serve/src/og.rs

//! Social preview image (1200×630 SVG) built from a page title.

use crate::markup;

pub const WIDTH: u32 = 1200;
pub const HEIGHT: u32 = 630;

const LINE_CHARS: usize = 28;
const MAX_LINES: usize = 3;

/// Greedy word wrap; overflowing titles end with an ellipsis.
fn wrap(title: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in title.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > LINE_CHARS && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }

    if lines.len() > MAX_LINES {
        lines.truncate(MAX_LINES);
        if let Some(last) = lines.last_mut() {
            last.push('…');
        }
    }
    lines
}

pub fn render_social_image(title: &str, site_name: &str) -> String {
    let lines = wrap(title);
    let line_height = 84;
    let first_y = HEIGHT as usize / 2 - (lines.len().saturating_sub(1) * line_height) / 2;

    let tspans: String = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            format!(
                r#"<tspan x="600" y="{}">{}</tspan>"#,
                first_y + i * line_height,
                markup::text(line)
            )
        })
        .collect();

    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            r##"<rect width="{w}" height="{h}" fill="#000000"/>"##,
            r##"<text text-anchor="middle" fill="#ffffff" font-family="system-ui, sans-serif" font-size="72" font-weight="700">{tspans}</text>"##,
            r##"<text x="600" y="570" text-anchor="middle" fill="#a3a3a3" font-family="system-ui, sans-serif" font-size="32">{site}</text>"##,
            "</svg>"
        ),
        w = WIDTH,
        h = HEIGHT,
        tspans = tspans,
        site = markup::text(site_name),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_has_fixed_size_and_escaped_title() {
        let svg = render_social_image("Tips & <Tricks>", "Acme Store");
        assert!(svg.contains(r#"width="1200" height="630""#));
        assert!(svg.contains("Tips &amp; &lt;Tricks&gt;"));
        assert!(svg.contains("Acme Store"));
    }

    #[test]
    fn long_titles_wrap_and_truncate() {
        let lines = wrap("one two three four five six seven eight nine ten eleven twelve thirteen fourteen fifteen sixteen");
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.trim_end_matches('…').chars().count() <= 28));
        assert!(lines[2].ends_with('…'));
    }
}
