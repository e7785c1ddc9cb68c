// crates/domain/src/commerce.rs

//! Catalog entities as the storefront sees them.
//!
//! These are the *reshaped* forms: connection edges are flattened into plain
//! vectors and optional nested objects are kept optional. The wire shapes of
//! the commerce API live with the client in the `adapt` crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    pub amount: String,
    pub currency_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Seo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A content page owned by the commerce backend (not a product or collection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub body_summary: String,
    #[serde(default)]
    pub seo: Option<Seo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedOption {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductOption {
    pub id: String,
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: String,
    pub title: String,
    pub available_for_sale: bool,
    #[serde(default)]
    pub selected_options: Vec<SelectedOption>,
    pub price: Money,
    #[serde(default)]
    pub sku: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRange {
    pub max_variant_price: Money,
    pub min_variant_price: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
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
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
    #[serde(default)]
    pub featured_image: Option<Image>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub seo: Option<Seo>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Storefront path of the product detail page.
    pub fn path(&self) -> String {
        format!("/product/{}", self.handle)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub handle: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub seo: Option<Seo>,
    #[serde(default)]
    pub image: Option<Image>,
    pub updated_at: DateTime<Utc>,
}

impl Collection {
    pub fn path(&self) -> String {
        format!("/search/{}", self.handle)
    }
}

/// Sort keys accepted by the product listing queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductSortKey {
    #[default]
    Relevance,
    BestSelling,
    CreatedAt,
    Price,
    Title,
}

/// Filter/sort options for product listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub query: Option<String>,
    pub sort_key: Option<ProductSortKey>,
    pub reverse: bool,
}

impl ProductQuery {
    /// Products belonging to a collection, using the search syntax of the
    /// catalog API (`collection:<handle>`).
    pub fn in_collection(handle: &str) -> Self {
        Self {
            query: Some(format!("collection:{handle}")),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartCost {
    pub subtotal_amount: Money,
    pub total_amount: Money,
    #[serde(default)]
    pub total_tax_amount: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartProduct {
    pub handle: String,
    pub title: String,
    #[serde(default)]
    pub featured_image: Option<Image>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Merchandise {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub selected_options: Vec<SelectedOption>,
    pub product: CartProduct,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineCost {
    pub total_amount: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: String,
    pub quantity: u32,
    pub cost: CartLineCost,
    pub merchandise: Merchandise,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: String,
    pub checkout_url: String,
    pub cost: CartCost,
    pub lines: Vec<CartLine>,
    pub total_quantity: u32,
}

/// A line to add to a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    pub merchandise_id: String,
    pub quantity: u32,
}

/// A quantity change for an existing cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineUpdate {
    pub id: String,
    pub merchandise_id: String,
    pub quantity: u32,
}
