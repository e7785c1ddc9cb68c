// crates/serve/src/blocks/commerce.rs

//! Blocks that pull catalog data at render time.
//!
//! Product and collection references in blocks are weak: a missing or failing
//! lookup degrades to a message or an empty section. Lookup failures are
//! logged and otherwise treated as "nothing found".

use super::{BlockRenderer, RenderContext};
use crate::{
    backend::BackendError,
    markup::{attr, background, editable, money, strip_tags, text, url, variant},
    render::long_date,
    richtext,
};
use async_trait::async_trait;
use domain::{
    cms::Block,
    commerce::{Product, ProductQuery},
};
use futures::future::join_all;
use serde_json::Value as Json;

const GRID_COLUMNS: &[(&str, &str)] = &[
    ("2", "grid-cols-1 sm:grid-cols-2"),
    ("3", "grid-cols-1 sm:grid-cols-2 lg:grid-cols-3"),
    ("4", "grid-cols-1 sm:grid-cols-2 lg:grid-cols-4"),
    ("5", "grid-cols-1 sm:grid-cols-2 lg:grid-cols-5"),
];

const SPOTLIGHT_LAYOUT: &[(&str, &str)] = &[
    ("left", "lg:flex-row"),
    ("right", "lg:flex-row-reverse"),
    ("center", "lg:flex-col lg:items-center lg:text-center"),
];

const DEFAULT_MAX_PRODUCTS: usize = 6;

fn or_empty<T: Default>(what: &str, handle: &str, result: Result<T, BackendError>) -> T {
    result.unwrap_or_else(|error| {
        tracing::error!(%error, handle, "failed to fetch {what}");
        T::default()
    })
}

/// A product reference: a handle string, or a related story inlined by the
/// CMS in place of one.
fn reference(value: &Json) -> Option<String> {
    let handle = match value {
        Json::String(s) => Some(s.as_str()),
        Json::Object(story) => story
            .get("content")
            .and_then(|c| c.get("product_handle").or_else(|| c.get("handle")))
            .and_then(Json::as_str)
            .or_else(|| story.get("slug").and_then(Json::as_str)),
        _ => None,
    }?;
    let handle = handle.trim();
    (!handle.is_empty()).then(|| handle.to_owned())
}

fn references(block: &Block, key: &str) -> Vec<String> {
    match block.value(key) {
        Some(Json::Array(items)) => items.iter().filter_map(reference).collect(),
        _ => Vec::new(),
    }
}

fn message(block: &Block, color: &str, msg: &str) -> String {
    format!(
        r#"<div class="py-8"{}><p class="text-center {color}">{}</p></div>"#,
        editable(block),
        text(msg)
    )
}

fn max_products(block: &Block) -> usize {
    block
        .number("max_products")
        .filter(|n| *n > 0)
        .map(|n| n as usize)
        .unwrap_or(DEFAULT_MAX_PRODUCTS)
}

fn product_card(product: &Product, show_description: bool) -> String {
    let image = product
        .featured_image
        .as_ref()
        .map(|img| {
            format!(
                r#"<img src="{}" alt="{}" class="h-full w-full object-cover" />"#,
                url(&img.url),
                attr(&product.title)
            )
        })
        .unwrap_or_default();

    let description = if show_description && !product.description.is_empty() {
        let plain = strip_tags(&product.description);
        let short: String = plain.chars().take(100).collect();
        format!(
            r#"<p class="text-sm text-gray-600 line-clamp-2">{}...</p>"#,
            text(&short)
        )
    } else {
        String::new()
    };

    format!(
        concat!(
            r#"<a href="{}" class="group"><div class="aspect-square overflow-hidden rounded-lg bg-gray-100">{}</div>"#,
            r#"<div class="mt-4 space-y-2"><h3 class="text-sm font-medium text-gray-900">{}</h3>{}"#,
            r#"<p class="text-sm font-medium text-gray-900">{}</p></div></a>"#
        ),
        url(&product.path()),
        image,
        text(&product.title),
        description,
        money(&product.price_range.max_variant_price),
    )
}

fn section_header(block: &Block, title: Option<&str>, fallback_description: &str) -> String {
    let title = title
        .map(|t| {
            format!(
                r#"<h2 class="text-3xl font-bold tracking-tight text-gray-900 sm:text-4xl">{}</h2>"#,
                text(t)
            )
        })
        .unwrap_or_default();

    let description = match block.value("description") {
        v if !richtext::is_empty(v) => v.map(richtext::render).unwrap_or_default(),
        _ if !fallback_description.is_empty() => format!("<p>{}</p>", text(fallback_description)),
        _ => String::new(),
    };
    let description = if description.is_empty() {
        description
    } else {
        format!(r#"<div class="mx-auto mt-4 max-w-3xl text-lg text-gray-600">{description}</div>"#)
    };

    if title.is_empty() && description.is_empty() {
        String::new()
    } else {
        format!(r#"<div class="mb-12 text-center">{title}{description}</div>"#)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// product_spotlight
// ─────────────────────────────────────────────────────────────────────────────

pub(super) struct ProductSpotlight;

#[async_trait]
impl BlockRenderer for ProductSpotlight {
    async fn render(&self, block: &Block, ctx: &RenderContext<'_>) -> String {
        let Some(handle) = block.value("product_handle").and_then(reference) else {
            return message(block, "text-gray-500", "No product selected");
        };

        let product = match ctx.commerce.get_product(&handle).await {
            Ok(Some(product)) => product,
            Ok(None) => {
                return message(block, "text-red-500", &format!("Product not found: {handle}"))
            }
            Err(error) => {
                tracing::error!(%error, handle = %handle, "failed to fetch spotlight product");
                return message(block, "text-red-500", &format!("Product not found: {handle}"));
            }
        };

        spotlight(block, &product)
    }
}

fn spotlight(block: &Block, product: &Product) -> String {
    let layout = variant(block, "layout", SPOTLIGHT_LAYOUT, "left");

    let lifestyle = block.assets("lifestyle_images");
    let images: String = if lifestyle.is_empty() {
        product
            .images
            .iter()
            .map(|img| {
                format!(
                    r#"<img src="{}" alt="{}" class="h-96 w-full rounded-lg object-cover" />"#,
                    url(&img.url),
                    attr(img.alt_text.as_deref().unwrap_or(&product.title))
                )
            })
            .collect()
    } else {
        lifestyle
            .iter()
            .map(|a| {
                format!(
                    r#"<img src="{}" alt="{}" width="600" height="400" class="h-96 w-full rounded-lg object-cover" />"#,
                    url(&a.filename),
                    attr(a.alt_or(&product.title))
                )
            })
            .collect()
    };

    let headline = block
        .text("headline")
        .map(|h| {
            format!(
                r#"<h2 class="text-3xl font-bold tracking-tight text-gray-900 sm:text-4xl">{}</h2>"#,
                text(h)
            )
        })
        .unwrap_or_default();

    let editorial = match block.value("editorial_content") {
        v if !richtext::is_empty(v) => format!(
            r#"<div class="prose prose-lg text-gray-600">{}</div>"#,
            v.map(richtext::render).unwrap_or_default()
        ),
        _ => String::new(),
    };

    let description = if product.description.is_empty() {
        String::new()
    } else {
        format!(r#"<div class="text-gray-600">{}</div>"#, text(&product.description))
    };

    let variants = if block.flag("show_variants") && product.variants.len() > 1 {
        let chips: String = product
            .variants
            .iter()
            .take(6)
            .map(|v| {
                format!(
                    r#"<span class="rounded-md border border-gray-300 px-3 py-1 text-sm">{}</span>"#,
                    text(&v.title)
                )
            })
            .collect();
        format!(
            r#"<div class="space-y-4"><h4 class="font-medium text-gray-900">Available Options:</h4><div class="flex flex-wrap gap-2">{chips}</div></div>"#
        )
    } else {
        String::new()
    };

    let cta = block.text("custom_cta").unwrap_or("Add to Cart");
    let merchandise = product
        .variants
        .first()
        .map(|v| v.id.as_str())
        .unwrap_or_default();
    let sku = product
        .variants
        .first()
        .and_then(|v| v.sku.as_deref())
        .filter(|s| !s.is_empty())
        .unwrap_or("N/A");
    let (stock_class, stock) = if product.available_for_sale {
        ("text-green-600", "In Stock")
    } else {
        ("text-red-600", "Out of Stock")
    };

    format!(
        concat!(
            r#"<section class="py-16 {bg}"{edit}><div class="mx-auto max-w-7xl px-4 sm:px-6 lg:px-8">"#,
            r#"<div class="flex flex-col gap-8 lg:gap-16 {layout}">"#,
            r#"<div class="flex-1"><div class="grid grid-cols-1 gap-4">{images}</div></div>"#,
            r#"<div class="flex-1 space-y-6">{headline}"#,
            r#"<h3 class="text-2xl font-semibold text-gray-900">{title}</h3>"#,
            r#"<p class="text-2xl font-bold">{price}</p>"#,
            "{editorial}{description}{variants}",
            r#"<div class="flex flex-col gap-4 sm:flex-row">"#,
            r#"<form method="post" action="/api/cart/lines" class="flex-1"><input type="hidden" name="merchandiseId" value="{merchandise}" />"#,
            r#"<button type="submit" class="w-full rounded-md bg-gray-900 px-6 py-3 text-sm font-medium text-white"{disabled}>{cta}</button></form>"#,
            r#"<a href="{path}" class="flex-1 rounded-md border border-gray-300 bg-white px-6 py-3 text-sm font-medium text-gray-900">Learn More</a></div>"#,
            r#"<div class="border-t border-gray-200 pt-6"><div class="grid grid-cols-2 gap-4 text-sm text-gray-600">"#,
            r#"<div><span class="font-medium">SKU:</span> {sku}</div>"#,
            r#"<div><span class="font-medium">Availability:</span> <span class="{stock_class}">{stock}</span></div>"#,
            "</div></div></div></div></div></section>"
        ),
        bg = background(block, "bg-white"),
        edit = editable(block),
        layout = layout,
        images = images,
        headline = headline,
        title = text(&product.title),
        price = money(&product.price_range.max_variant_price),
        editorial = editorial,
        description = description,
        variants = variants,
        merchandise = attr(merchandise),
        disabled = if product.available_for_sale { "" } else { " disabled" },
        cta = text(cta),
        path = url(&product.path()),
        sku = text(sku),
        stock_class = stock_class,
        stock = stock,
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// product_grid
// ─────────────────────────────────────────────────────────────────────────────

pub(super) struct ProductGrid;

#[async_trait]
impl BlockRenderer for ProductGrid {
    async fn render(&self, block: &Block, ctx: &RenderContext<'_>) -> String {
        let products = if let Some(collection) = block.text("collection_handle") {
            let found = ctx
                .commerce
                .get_products(ProductQuery::in_collection(collection))
                .await;
            or_empty("collection products", collection, found)
        } else {
            let handles = references(block, "products");
            if handles.is_empty() {
                return format!(
                    "<div{}>No collection handle provided</div>",
                    editable(block)
                );
            }
            fetch_by_handle(ctx, &handles).await
        };

        let limit = max_products(block);
        let products: Vec<Product> = products.into_iter().take(limit).collect();

        let header = section_header(block, block.text("title"), "");
        let show_description = block.flag("show_description");
        let cards: String = products
            .iter()
            .map(|p| product_card(p, show_description))
            .collect();

        let items = if products.is_empty() {
            r#"<p class="text-center text-gray-500">No products found.</p>"#.to_owned()
        } else if block.text("layout") == Some("carousel") {
            format!(
                r#"<div class="overflow-x-auto pb-4"><div class="flex gap-6">{}</div></div>"#,
                products
                    .iter()
                    .map(|p| format!(
                        r#"<div class="w-64 flex-shrink-0">{}</div>"#,
                        product_card(p, show_description)
                    ))
                    .collect::<String>()
            )
        } else {
            let columns = variant(block, "columns", GRID_COLUMNS, "4");
            format!(r#"<div class="grid gap-6 {columns}">{cards}</div>"#)
        };

        let view_all = match block.text("collection_handle") {
            Some(handle) if products.len() >= limit => format!(
                r#"<div class="mt-12 text-center"><a href="/search/{}" class="inline-flex items-center rounded-md bg-gray-900 px-6 py-3 text-base font-medium text-white">View All Products</a></div>"#,
                attr(handle)
            ),
            _ => String::new(),
        };

        format!(
            r#"<section class="py-16 {}"{}><div class="mx-auto max-w-7xl px-4 sm:px-6 lg:px-8">{header}{items}{view_all}</div></section>"#,
            background(block, "bg-white"),
            editable(block)
        )
    }
}

/// Products by explicit handle, fetched concurrently, in the given order.
/// Missing handles are skipped.
async fn fetch_by_handle(ctx: &RenderContext<'_>, handles: &[String]) -> Vec<Product> {
    let lookups = handles.iter().map(|h| async move {
        let found = ctx.commerce.get_product(h).await;
        or_empty("product", h, found)
    });
    join_all(lookups).await.into_iter().flatten().collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// collection_showcase
// ─────────────────────────────────────────────────────────────────────────────

pub(super) struct CollectionShowcase;

#[async_trait]
impl BlockRenderer for CollectionShowcase {
    async fn render(&self, block: &Block, ctx: &RenderContext<'_>) -> String {
        let Some(handle) = block.text("collection_handle") else {
            return message(block, "text-gray-500", "No collection handle provided");
        };

        let (collection, products) = futures::join!(
            ctx.commerce.get_collection(handle),
            ctx.commerce.get_products(ProductQuery::in_collection(handle))
        );
        let collection = or_empty("collection", handle, collection);
        let products = or_empty("collection products", handle, products);

        let Some(collection) = collection else {
            return message(
                block,
                "text-red-500",
                &format!("Collection not found: {handle}"),
            );
        };
        let products: Vec<Product> = products.into_iter().take(max_products(block)).collect();

        let title = block.text("title").unwrap_or(&collection.title);
        let show_link = block.flag("show_collection_link");
        let link = |label: String| {
            if show_link {
                format!(
                    r#"<div class="mt-12 text-center"><a href="{}" class="inline-flex items-center rounded-md bg-gray-900 px-6 py-3 text-base font-medium text-white">{}</a></div>"#,
                    url(&collection.path()),
                    text(&label)
                )
            } else {
                String::new()
            }
        };

        let body = match block.text("layout") {
            Some("banner") => {
                let (src, alt) = match block.asset("custom_image") {
                    Some(img) => (img.filename.clone(), img.alt_or(&collection.title).to_owned()),
                    None => (
                        collection
                            .image
                            .as_ref()
                            .map(|i| i.url.clone())
                            .unwrap_or_else(|| "/placeholder.jpg".to_owned()),
                        collection.title.clone(),
                    ),
                };
                format!(
                    concat!(
                        r#"<div class="grid grid-cols-1 gap-8 lg:grid-cols-2 lg:gap-16">"#,
                        r#"<div class="flex flex-col justify-center space-y-6">{}{}</div>"#,
                        r#"<div class="relative"><img src="{}" alt="{}" class="h-96 w-full rounded-lg object-cover lg:h-full" /></div></div>"#
                    ),
                    section_header(block, Some(title), &collection.description),
                    link(format!("Shop {}", collection.title)),
                    url(&src),
                    attr(&alt),
                )
            }
            Some("cards") => format!(
                r#"{}<div class="grid grid-cols-1 gap-6 sm:grid-cols-2 lg:grid-cols-3">{}</div>{}"#,
                section_header(block, Some(title), &collection.description),
                products.iter().map(|p| product_card(p, false)).collect::<String>(),
                link(format!("View All {}", collection.title)),
            ),
            _ => format!(
                r#"{}<div class="grid grid-cols-2 gap-4 sm:grid-cols-3 lg:grid-cols-4">{}</div>{}"#,
                section_header(block, Some(title), &collection.description),
                products.iter().map(|p| product_card(p, false)).collect::<String>(),
                link(format!("View all {}", collection.title)),
            ),
        };

        format!(
            r#"<section class="py-16 {}"{}><div class="mx-auto max-w-7xl px-4 sm:px-6 lg:px-8">{body}</div></section>"#,
            background(block, "bg-white"),
            editable(block)
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// blog_post
// ─────────────────────────────────────────────────────────────────────────────

pub(super) struct BlogPost;

#[async_trait]
impl BlockRenderer for BlogPost {
    async fn render(&self, block: &Block, ctx: &RenderContext<'_>) -> String {
        let handles = references(block, "featured_products");
        let featured = if handles.is_empty() {
            Vec::new()
        } else {
            fetch_by_handle(ctx, &handles).await
        };

        let title = block.text("title").unwrap_or_default();
        let image = block
            .asset("featured_image")
            .map(|img| {
                format!(
                    r#"<img src="{}" alt="{}" class="mb-8 h-96 w-full rounded-lg object-cover" />"#,
                    url(&img.filename),
                    attr(img.alt_or(title))
                )
            })
            .unwrap_or_default();

        let mut meta = Vec::new();
        if let Some(author) = block.text("author") {
            meta.push(format!("<span>By {}</span>", text(author)));
        }
        if let Some(date) = block.text("publish_date") {
            meta.push(format!(
                r#"<time datetime="{}">{}</time>"#,
                attr(date),
                text(&long_date(date))
            ));
        }
        let tags = block.strings("tags");
        if !tags.is_empty() {
            let chips: String = tags
                .iter()
                .map(|t| {
                    format!(
                        r#"<span class="rounded-full bg-gray-100 px-3 py-1 text-xs font-medium text-gray-800">{}</span>"#,
                        text(t)
                    )
                })
                .collect();
            meta.push(format!(r#"<div class="flex gap-2">{chips}</div>"#));
        }

        let content = match block.value("content") {
            v if !richtext::is_empty(v) => format!(
                r#"<div class="prose prose-lg max-w-none text-gray-700">{}</div>"#,
                v.map(richtext::render).unwrap_or_default()
            ),
            _ => String::new(),
        };

        let products = if featured.is_empty() {
            String::new()
        } else {
            format!(
                r#"<section class="mt-16 border-t border-gray-200 pt-16"><h2 class="mb-8 text-2xl font-bold text-gray-900">Featured Products</h2><div class="grid grid-cols-1 gap-6 sm:grid-cols-2 lg:grid-cols-3">{}</div></section>"#,
                featured.iter().map(|p| product_card(p, false)).collect::<String>()
            )
        };

        format!(
            concat!(
                r#"<article class="py-16"{}><div class="mx-auto max-w-4xl px-4 sm:px-6 lg:px-8"><header class="mb-12">{}"#,
                "{}{}",
                r#"<div class="flex flex-wrap items-center gap-6 text-sm text-gray-500">{}</div></header>"#,
                "{}{}</div></article>"
            ),
            editable(block),
            image,
            block
                .text("title")
                .map(|t| format!(
                    r#"<h1 class="mb-4 text-4xl font-bold tracking-tight text-gray-900 sm:text-5xl">{}</h1>"#,
                    text(t)
                ))
                .unwrap_or_default(),
            block
                .text("excerpt")
                .map(|e| format!(r#"<p class="mb-6 text-xl text-gray-600">{}</p>"#, text(e)))
                .unwrap_or_default(),
            meta.concat(),
            content,
            products,
        )
    }
}
