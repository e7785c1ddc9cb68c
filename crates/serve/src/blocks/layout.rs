// crates/serve/src/blocks/layout.rs

//! Presentational blocks. Apart from `page`, these only read their own
//! attributes.

use super::{BlockRenderer, RenderContext};
use crate::{
    markup::{self, attr, background, editable, text, url, variant},
    richtext,
};
use async_trait::async_trait;
use domain::cms::{Block, CallToAction};

const HERO_HEIGHT: &[(&str, &str)] = &[
    ("small", "h-96"),
    ("medium", "h-[32rem]"),
    ("large", "h-[40rem]"),
    ("fullscreen", "h-screen"),
];

const TEXT_POSITION: &[(&str, &str)] = &[
    ("left", "text-left items-start"),
    ("center", "text-center items-center"),
    ("right", "text-right items-end"),
];

const TEXT_COLOR: &[(&str, &str)] = &[
    ("white", "text-white"),
    ("black", "text-gray-900"),
    ("gray", "text-gray-600"),
];

const ALIGNMENT: &[(&str, &str)] = &[
    ("left", "text-left"),
    ("center", "text-center"),
    ("right", "text-right"),
];

const MAX_WIDTH: &[(&str, &str)] = &[
    ("narrow", "max-w-2xl"),
    ("medium", "max-w-4xl"),
    ("wide", "max-w-6xl"),
    ("full", "max-w-full"),
];

const BUTTON_SIZE: &[(&str, &str)] = &[
    ("small", "px-4 py-2 text-sm"),
    ("medium", "px-6 py-3 text-base"),
    ("large", "px-8 py-4 text-lg"),
];

const BUTTON_STYLE: &[(&str, &str)] = &[
    ("primary", "bg-gray-900 text-white hover:bg-gray-800"),
    ("secondary", "bg-white text-gray-900 hover:bg-gray-100"),
    (
        "outline",
        "border-2 border-current bg-transparent hover:bg-current hover:text-white",
    ),
];

const GALLERY_COLUMNS: &[(&str, &str)] = &[
    ("2", "grid-cols-1 sm:grid-cols-2"),
    ("3", "grid-cols-1 sm:grid-cols-2 lg:grid-cols-3"),
    ("4", "grid-cols-1 sm:grid-cols-2 lg:grid-cols-4"),
];

const GALLERY_GAP: &[(&str, &str)] = &[("small", "gap-2"), ("medium", "gap-4"), ("large", "gap-8")];

const H2: &str = "text-3xl font-bold tracking-tight text-gray-900 sm:text-4xl";

/// Optional rich-text field wrapped in a div with the given classes.
fn rich(block: &Block, key: &str, class: &str) -> String {
    let value = block.value(key);
    if richtext::is_empty(value) {
        return String::new();
    }
    match value {
        Some(v) => format!(r#"<div class="{class}">{}</div>"#, richtext::render(v)),
        None => String::new(),
    }
}

fn heading(block: &Block, key: &str, tag: &str, class: &str) -> String {
    block
        .text(key)
        .map(|t| format!(r#"<{tag} class="{class}">{}</{tag}>"#, text(t)))
        .unwrap_or_default()
}

pub(super) struct PageRenderer;

#[async_trait]
impl BlockRenderer for PageRenderer {
    async fn render(&self, block: &Block, ctx: &RenderContext<'_>) -> String {
        let title = block
            .text("title")
            .map(|t| {
                format!(
                    r#"<div class="container mx-auto px-4 py-8"><h1 class="text-4xl font-bold text-center mb-8">{}</h1></div>"#,
                    text(t)
                )
            })
            .unwrap_or_default();

        let body = ctx.render_all(&block.children("body")).await;

        format!(
            r#"<main class="min-h-screen"{}>{title}{body}</main>"#,
            editable(block)
        )
    }
}

fn hero_cta(cta: &CallToAction, primary: bool) -> String {
    let style = match cta.style.as_deref() {
        Some("outline") => "border-2 border-white text-white hover:bg-white hover:text-gray-900",
        Some("secondary") => "bg-white text-gray-900 hover:bg-gray-100",
        _ if !primary => "bg-white text-gray-900 hover:bg-gray-100",
        _ => "bg-gray-900 text-white hover:bg-gray-800",
    };
    format!(
        r#"<a href="{}" class="inline-flex items-center rounded-md px-8 py-3 text-base font-medium transition-all duration-200 {style}">{}</a>"#,
        url(&cta.url),
        text(&cta.text)
    )
}

pub(super) fn hero(block: &Block) -> String {
    let height = variant(block, "height", HERO_HEIGHT, "medium");
    let position = variant(block, "text_position", TEXT_POSITION, "center");
    let color = variant(block, "text_color", TEXT_COLOR, "white");

    let media = if let Some(video) = block.asset("background_video") {
        format!(
            r#"<video autoplay muted loop playsinline class="absolute inset-0 h-full w-full object-cover"><source src="{}" type="video/mp4" /></video>"#,
            url(&video.filename)
        )
    } else if let Some(image) = block.asset("background_image") {
        format!(
            r#"<img src="{}" alt="{}" class="absolute inset-0 h-full w-full object-cover" />"#,
            url(&image.filename),
            attr(image.alt_or("Hero background"))
        )
    } else {
        r#"<div class="absolute inset-0 bg-gradient-to-r from-gray-900 to-gray-700"></div>"#.to_owned()
    };

    let headline = heading(
        block,
        "headline",
        "h1",
        &format!("text-4xl font-bold tracking-tight sm:text-5xl lg:text-6xl {color}"),
    );
    let sub = rich(
        block,
        "subheadline",
        &format!("text-xl sm:text-2xl {color} opacity-90"),
    );

    let ctas: Vec<String> = [
        block.call_to_action("primary_cta").map(|c| hero_cta(&c, true)),
        block.call_to_action("secondary_cta").map(|c| hero_cta(&c, false)),
    ]
    .into_iter()
    .flatten()
    .collect();
    let ctas = if ctas.is_empty() {
        String::new()
    } else {
        format!(
            r#"<div class="flex flex-col gap-4 sm:flex-row sm:gap-6">{}</div>"#,
            ctas.concat()
        )
    };

    let scroll = if block.text("height") == Some("fullscreen") {
        r#"<div class="absolute bottom-8 left-1/2 -translate-x-1/2"><span class="text-sm text-white opacity-70">Scroll to explore</span></div>"#
    } else {
        ""
    };

    format!(
        concat!(
            r#"<section class="relative flex items-center justify-center {height}"{edit}>"#,
            "{media}",
            r#"<div class="absolute inset-0 bg-black" style="opacity: {opacity}"></div>"#,
            r#"<div class="relative z-10 mx-auto max-w-7xl px-4 sm:px-6 lg:px-8 {position}">"#,
            r#"<div class="max-w-4xl space-y-6">{headline}{sub}{ctas}</div></div>"#,
            "{scroll}</section>"
        ),
        height = height,
        edit = editable(block),
        media = media,
        opacity = markup::opacity(block),
        position = position,
        headline = headline,
        sub = sub,
        ctas = ctas,
        scroll = scroll,
    )
}

pub(super) fn text_block(block: &Block) -> String {
    let width = variant(block, "max_width", MAX_WIDTH, "medium");
    let align = variant(block, "alignment", ALIGNMENT, "left");
    let content = rich(
        block,
        "content",
        "prose prose-lg text-gray-600 prose-headings:text-gray-900 prose-links:text-gray-900",
    );

    format!(
        r#"<section class="py-16 {}"{}><div class="mx-auto px-4 sm:px-6 lg:px-8"><div class="mx-auto {width} {align}">{content}</div></div></section>"#,
        background(block, ""),
        editable(block)
    )
}

pub(super) fn cta_section(block: &Block) -> String {
    let overlay = block
        .asset("background_image")
        .map(|image| {
            format!(
                r#"<img src="{}" alt="{}" class="absolute inset-0 h-full w-full object-cover" /><div class="absolute inset-0 bg-black" style="opacity: {}"></div>"#,
                url(&image.filename),
                attr(image.alt_or("")),
                markup::opacity(block)
            )
        })
        .unwrap_or_default();

    let buttons: Vec<String> = [
        block.call_to_action("primary_button").map(|b| {
            format!(
                r#"<a href="{}" class="inline-flex items-center rounded-md bg-white px-8 py-3 text-base font-medium text-gray-900 hover:bg-gray-100">{}</a>"#,
                url(&b.url),
                text(&b.text)
            )
        }),
        block.call_to_action("secondary_button").map(|b| {
            format!(
                r#"<a href="{}" class="inline-flex items-center rounded-md border-2 border-white px-8 py-3 text-base font-medium text-white hover:bg-white hover:text-gray-900">{}</a>"#,
                url(&b.url),
                text(&b.text)
            )
        }),
    ]
    .into_iter()
    .flatten()
    .collect();
    let buttons = if buttons.is_empty() {
        String::new()
    } else {
        format!(
            r#"<div class="mt-10 flex flex-col gap-4 sm:flex-row sm:justify-center sm:gap-6">{}</div>"#,
            buttons.concat()
        )
    };

    format!(
        r#"<section class="relative py-24 {}"{}>{overlay}<div class="relative mx-auto max-w-7xl px-4 sm:px-6 lg:px-8"><div class="text-center">{}{}{buttons}</div></div></section>"#,
        background(block, "bg-gray-900"),
        editable(block),
        heading(
            block,
            "headline",
            "h2",
            "text-3xl font-bold tracking-tight text-white sm:text-4xl"
        ),
        rich(block, "description", "mx-auto mt-6 max-w-3xl text-lg text-gray-300"),
    )
}

pub(super) fn cta_button(block: &Block) -> String {
    let (Some(label), Some(href)) = (block.text("text"), block.text("url")) else {
        return String::new();
    };
    let size = variant(block, "size", BUTTON_SIZE, "medium");
    let style = variant(block, "style", BUTTON_STYLE, "primary");

    format!(
        r#"<a href="{}" class="inline-flex items-center rounded-md font-medium transition-all duration-200 {size} {style}"{}>{}</a>"#,
        url(href),
        editable(block),
        text(label)
    )
}

fn stars(rating: u64) -> String {
    if rating == 0 {
        return String::new();
    }
    let stars: String = (0..5)
        .map(|i| {
            let color = if i < rating { "text-yellow-400" } else { "text-gray-300" };
            format!(r#"<span class="h-5 w-5 {color}">★</span>"#)
        })
        .collect();
    format!(
        r#"<div class="mb-4 flex" aria-label="{} out of 5">{stars}</div>"#,
        rating.min(5)
    )
}

fn testimonial_card(t: &Block) -> String {
    let name = t.text("name").unwrap_or_default();
    let avatar = t.asset("avatar");
    let avatar_html = avatar
        .as_ref()
        .map(|a| {
            format!(
                r#"<img src="{}" alt="{}" class="h-10 w-10 rounded-full object-cover" />"#,
                url(&a.filename),
                attr(a.alt_or(name))
            )
        })
        .unwrap_or_default();

    let byline = match (t.text("role"), t.text("company")) {
        (Some(role), Some(company)) => format!("{}, {}", text(role), text(company)),
        (Some(one), None) | (None, Some(one)) => text(one),
        (None, None) => String::new(),
    };
    let byline = if byline.is_empty() {
        byline
    } else {
        format!(r#"<p class="text-sm text-gray-500">{byline}</p>"#)
    };

    format!(
        concat!(
            r#"<div class="rounded-lg bg-white p-8 shadow-sm"{}>{}"#,
            r#"<div class="mb-6 text-gray-600">{}</div>"#,
            r#"<div class="flex items-center">{}<div class="{}">"#,
            r#"<p class="text-sm font-medium text-gray-900">{}</p>{}</div></div></div>"#
        ),
        editable(t),
        stars(t.number("rating").unwrap_or(0)),
        t.value("content").map(richtext::render).unwrap_or_default(),
        avatar_html,
        if avatar.is_some() { "ml-4" } else { "" },
        text(name),
        byline,
    )
}

pub(super) fn testimonial(block: &Block) -> String {
    testimonial_card(block)
}

pub(super) fn testimonial_grid(block: &Block) -> String {
    let title = heading(block, "title", "h2", H2);
    let title = if title.is_empty() {
        title
    } else {
        format!(r#"<div class="mb-12 text-center">{title}</div>"#)
    };
    let cards: String = block
        .items("testimonials")
        .iter()
        .map(testimonial_card)
        .collect();

    format!(
        r#"<section class="py-16 {}"{}><div class="mx-auto max-w-7xl px-4 sm:px-6 lg:px-8">{title}<div class="grid grid-cols-1 gap-8 lg:grid-cols-3">{cards}</div></div></section>"#,
        background(block, "bg-gray-50"),
        editable(block)
    )
}

pub(super) fn newsletter_signup(block: &Block) -> String {
    let direction = if block.text("layout") == Some("inline") {
        "flex-row gap-3"
    } else {
        "flex-col gap-4"
    };

    format!(
        concat!(
            r#"<section class="py-16 {bg}"{edit}><div class="mx-auto max-w-4xl px-4 sm:px-6 lg:px-8"><div class="text-center">"#,
            "{title}{description}",
            r#"<form method="post" action="/api/newsletter" data-newsletter data-success-message="{success}" class="mx-auto mt-8 max-w-md">"#,
            r#"<div class="flex {direction}"><div class="flex-1">"#,
            r#"<label for="email-{uid}" class="sr-only">Email address</label>"#,
            r#"<input id="email-{uid}" name="email" type="email" autocomplete="email" required placeholder="{placeholder}" class="w-full rounded-md border border-gray-300 px-4 py-3 text-base" />"#,
            r#"</div><button type="submit" class="rounded-md bg-gray-900 px-6 py-3 text-base font-medium text-white hover:bg-gray-800">{button}</button></div></form>"#,
            r#"<p class="mt-4 text-sm text-gray-500">We respect your privacy and never share your email address.</p>"#,
            "</div></div></section>"
        ),
        bg = background(block, "bg-gray-50"),
        edit = editable(block),
        title = heading(block, "title", "h2", H2),
        description = rich(block, "description", "mx-auto mt-4 max-w-3xl text-lg text-gray-600"),
        success = attr(block.text("success_message").unwrap_or("Thanks for subscribing!")),
        direction = direction,
        uid = attr(&block.uid),
        placeholder = attr(block.text("placeholder_text").unwrap_or("Enter your email")),
        button = text(block.text("button_text").unwrap_or("Subscribe")),
    )
}

/// SEO blocks feed page metadata and render nothing.
pub(super) fn seo(_block: &Block) -> String {
    String::new()
}

pub(super) fn faq_section(block: &Block) -> String {
    let entries: String = block
        .items("faqs")
        .iter()
        .filter_map(|faq| {
            let question = faq.text("question")?;
            Some(format!(
                concat!(
                    r#"<details class="border-b border-gray-200"{}>"#,
                    r#"<summary class="flex w-full items-center justify-between py-6 text-left"><span class="text-lg font-medium text-gray-900">{}</span></summary>"#,
                    r#"<div class="pb-6"><div class="prose text-gray-600">{}</div></div></details>"#
                ),
                editable(faq),
                text(question),
                faq.value("answer").map(richtext::render).unwrap_or_default()
            ))
        })
        .collect();
    let entries = if entries.is_empty() {
        entries
    } else {
        format!(r#"<div class="space-y-4">{entries}</div>"#)
    };

    format!(
        r#"<section class="py-16 {}"{}><div class="mx-auto max-w-4xl px-4 sm:px-6 lg:px-8"><div class="mb-12 text-center">{}{}</div>{entries}</div></section>"#,
        background(block, "bg-white"),
        editable(block),
        heading(block, "title", "h2", H2),
        rich(block, "description", "mx-auto mt-4 max-w-3xl text-lg text-gray-600"),
    )
}

pub(super) fn image_gallery(block: &Block) -> String {
    let images = block.assets("images");
    if images.is_empty() {
        return String::new();
    }
    let columns = variant(block, "columns", GALLERY_COLUMNS, "3");
    let gap = variant(block, "gap", GALLERY_GAP, "medium");

    let tiles: String = images
        .iter()
        .enumerate()
        .map(|(i, image)| {
            let fallback = format!("Gallery image {}", i + 1);
            format!(
                r#"<div class="group overflow-hidden rounded-lg"><img src="{}" alt="{}" class="h-64 w-full object-cover" /></div>"#,
                url(&image.filename),
                attr(image.alt_or(&fallback))
            )
        })
        .collect();

    format!(
        r#"<section class="py-16"{}><div class="mx-auto max-w-7xl px-4 sm:px-6 lg:px-8"><div class="grid {columns} {gap}">{tiles}</div></div></section>"#,
        editable(block)
    )
}
