// crates/adapt/src/shopify/wire.rs

//! Response shapes of the Storefront API and their reshaping into the domain
//! types (edges flattened, hidden products dropped).

use chrono::{DateTime, Utc};
use domain::commerce::{
    Cart, CartCost, CartLine, Collection, Image, Page, PriceRange, Product, ProductOption,
    ProductVariant, Seo,
};
use serde::Deserialize;

/// Products carrying this tag never reach the storefront.
pub const HIDDEN_PRODUCT_TAG: &str = "nextjs-frontend-hidden";

#[derive(Debug, Deserialize)]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
}

#[derive(Debug, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

impl<T> Connection<T> {
    pub fn into_nodes(self) -> Vec<T> {
        self.edges.into_iter().map(|e| e.node).collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireProduct {
    pub id: String,
    pub handle: String,
    pub available_for_sale: bool,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub description_html: String,
    #[serde(default)]
    pub options: Vec<ProductOption>,
    pub price_range: PriceRange,
    pub variants: Connection<ProductVariant>,
    #[serde(default)]
    pub featured_image: Option<Image>,
    pub images: Connection<Image>,
    #[serde(default)]
    pub seo: Option<Seo>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl WireProduct {
    /// `None` for hidden products.
    pub fn reshape(self) -> Option<Product> {
        if self.tags.iter().any(|t| t == HIDDEN_PRODUCT_TAG) {
            return None;
        }

        let title = self.title;
        let images = self
            .images
            .into_nodes()
            .into_iter()
            .map(|image| Image {
                alt_text: image
                    .alt_text
                    .filter(|alt| !alt.is_empty())
                    .or_else(|| Some(image_alt(&image.url, &title))),
                ..image
            })
            .collect();

        Some(Product {
            id: self.id,
            handle: self.handle,
            available_for_sale: self.available_for_sale,
            title,
            description: self.description,
            description_html: self.description_html,
            options: self.options,
            price_range: self.price_range,
            variants: self.variants.into_nodes(),
            featured_image: self.featured_image,
            images,
            seo: self.seo,
            tags: self.tags,
            updated_at: self.updated_at,
        })
    }
}

/// Alt text for an image the merchant left undescribed: the product title
/// plus the file name.
fn image_alt(url: &str, title: &str) -> String {
    let file = url
        .rsplit('/')
        .next()
        .and_then(|f| f.split(['?', '.']).next())
        .unwrap_or_default();
    if file.is_empty() {
        title.to_owned()
    } else {
        format!("{title} - {file}")
    }
}

pub fn reshape_products(products: Connection<WireProduct>) -> Vec<Product> {
    products
        .into_nodes()
        .into_iter()
        .filter_map(WireProduct::reshape)
        .collect()
}

/// Collections whose handle starts with `hidden` are internal.
pub fn visible_collections(collections: Connection<Collection>) -> Vec<Collection> {
    collections
        .into_nodes()
        .into_iter()
        .filter(|c| !c.handle.starts_with("hidden"))
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCart {
    pub id: String,
    pub checkout_url: String,
    pub cost: CartCost,
    pub lines: Connection<CartLine>,
    pub total_quantity: u32,
}

impl From<WireCart> for Cart {
    fn from(cart: WireCart) -> Self {
        Cart {
            id: cart.id,
            checkout_url: cart.checkout_url,
            cost: cart.cost,
            lines: cart.lines.into_nodes(),
            total_quantity: cart.total_quantity,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Envelopes (the `data` object of each operation)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PageData {
    pub page: Option<Page>,
}

#[derive(Debug, Deserialize)]
pub struct PagesData {
    pub pages: Connection<Page>,
}

#[derive(Debug, Deserialize)]
pub struct ProductData {
    pub product: Option<WireProduct>,
}

#[derive(Debug, Deserialize)]
pub struct ProductsData {
    pub products: Connection<WireProduct>,
}

#[derive(Debug, Deserialize)]
pub struct CollectionData {
    pub collection: Option<Collection>,
}

#[derive(Debug, Deserialize)]
pub struct CollectionsData {
    pub collections: Connection<Collection>,
}

#[derive(Debug, Deserialize)]
pub struct CollectionProducts {
    pub products: Connection<WireProduct>,
}

#[derive(Debug, Deserialize)]
pub struct CollectionProductsData {
    pub collection: Option<CollectionProducts>,
}

#[derive(Debug, Deserialize)]
pub struct CartData {
    pub cart: Option<WireCart>,
}

#[derive(Debug, Deserialize)]
pub struct UserError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartPayload {
    pub cart: Option<WireCart>,
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
pub struct MutationData {
    pub payload: CartPayload,
}
