// crates/adapt/src/shopify/mod.rs

//! Commerce backend over the Shopify Storefront GraphQL API.
//!
//! Reads go through a [`TaggedCache`] keyed by operation and variables; cart
//! operations always hit the API.

pub mod queries;
pub mod revalidate;
pub mod wire;

use crate::cache::TaggedCache;
use async_trait::async_trait;
use domain::{
    commerce::{
        Cart, CartLineInput, CartLineUpdate, Collection, Page, Product, ProductQuery,
        ProductSortKey,
    },
    setting::CommerceSettings,
};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use revalidate::{TAG_COLLECTIONS, TAG_PAGES, TAG_PRODUCTS};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value as Json};
use serve::backend::{
    BackendError, CommerceBackend, RevalidateOutcome, RevalidateRequest,
};
use thiserror::Error;
use tracing::instrument;
use url::Url;
use wire::{
    CartData, CollectionData, CollectionProductsData, CollectionsData, MutationData, PageData,
    PagesData, ProductData, ProductsData,
};

const TOKEN_HEADER: &str = "x-shopify-storefront-access-token";

#[derive(Debug, Error)]
pub enum ShopifyError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("graphql errors: {}", .0.join("; "))]
    GraphQl(Vec<String>),

    #[error("cart error: {0}")]
    UserErrors(String),

    #[error("response had no data")]
    MissingData,

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid endpoint: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid access token header")]
    Header(#[from] reqwest::header::InvalidHeaderValue),
}

impl From<ShopifyError> for BackendError {
    fn from(err: ShopifyError) -> Self {
        match err {
            ShopifyError::Http(e) => BackendError::Transport(e.to_string()),
            ShopifyError::Status { status, body } => BackendError::Status {
                status,
                message: body,
            },
            e @ (ShopifyError::GraphQl(_) | ShopifyError::UserErrors(_)) => {
                BackendError::Api(e.to_string())
            }
            e @ (ShopifyError::MissingData | ShopifyError::Json(_)) => {
                BackendError::Decode(e.to_string())
            }
            e @ (ShopifyError::Url(_) | ShopifyError::Header(_)) => {
                BackendError::Transport(e.to_string())
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlMessage {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Json>,
    #[serde(default)]
    errors: Vec<GraphQlMessage>,
}

/// `https://{domain}/api/{version}/graphql.json`; a scheme on the domain is
/// tolerated.
pub fn endpoint(store_domain: &str, api_version: &str) -> Result<Url, ShopifyError> {
    let domain = store_domain
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');
    Ok(Url::parse(&format!(
        "https://{domain}/api/{api_version}/graphql.json"
    ))?)
}

/// Collection listings use a different sort enum than product search.
fn collection_sort_key(key: ProductSortKey) -> &'static str {
    match key {
        ProductSortKey::Relevance => "RELEVANCE",
        ProductSortKey::BestSelling => "BEST_SELLING",
        ProductSortKey::CreatedAt => "CREATED",
        ProductSortKey::Price => "PRICE",
        ProductSortKey::Title => "TITLE",
    }
}

pub struct ShopifyClient {
    http: reqwest::Client,
    endpoint: Url,
    revalidation_secret: Option<SecretString>,
    cache: TaggedCache,
}

impl ShopifyClient {
    pub fn new(settings: &CommerceSettings) -> Result<Self, ShopifyError> {
        let mut token =
            HeaderValue::from_str(settings.storefront_access_token.expose_secret())?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, token);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            endpoint: endpoint(&settings.store_domain, &settings.api_version)?,
            revalidation_secret: settings.revalidation_secret.clone(),
            cache: TaggedCache::new(settings.cache_capacity),
        })
    }

    pub fn cache(&self) -> &TaggedCache {
        &self.cache
    }

    /// One GraphQL round trip. `errors` in the payload win over `data`.
    async fn execute(&self, query: &str, variables: &Json) -> Result<Json, ShopifyError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ShopifyError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let body: GraphQlResponse = serde_json::from_str(&text)?;
        if !body.errors.is_empty() {
            return Err(ShopifyError::GraphQl(
                body.errors.into_iter().map(|e| e.message).collect(),
            ));
        }
        body.data.ok_or(ShopifyError::MissingData)
    }

    /// Cached read: `op` plus the variables form the key. When `entity` names
    /// the looked-up field, a null there is returned but not cached.
    async fn read<T: DeserializeOwned>(
        &self,
        op: &str,
        query: &str,
        variables: Json,
        tags: &[&'static str],
        entity: Option<&str>,
    ) -> Result<T, ShopifyError> {
        let key = format!("{op}:{variables}");
        let data = match self.cache.get(&key) {
            Some(hit) => {
                tracing::trace!(op, "cache hit");
                hit
            }
            None => {
                let data = self.execute(query, &variables).await?;
                self.remember(key, tags, entity, &data);
                data
            }
        };
        Ok(serde_json::from_value(data)?)
    }

    fn remember(&self, key: String, tags: &[&'static str], entity: Option<&str>, data: &Json) {
        if entity.is_some_and(|field| data[field].is_null()) {
            return;
        }
        self.cache.insert(key, tags, data.clone());
    }

    /// Uncached cart mutation; user errors are surfaced as failures.
    async fn mutate(&self, query: &str, variables: Json) -> Result<Cart, ShopifyError> {
        let data = self.execute(query, &variables).await?;
        let MutationData { payload } = serde_json::from_value(data)?;
        if !payload.user_errors.is_empty() {
            let message = payload
                .user_errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ShopifyError::UserErrors(message));
        }
        payload
            .cart
            .map(Cart::from)
            .ok_or(ShopifyError::MissingData)
    }

    async fn fetch_products(&self, query: ProductQuery) -> Result<Vec<Product>, ShopifyError> {
        let variables = json!({
            "query": query.query,
            "sortKey": query.sort_key,
            "reverse": query.reverse,
        });
        let data: ProductsData = self
            .read("getProducts", queries::GET_PRODUCTS, variables, &[TAG_PRODUCTS], None)
            .await?;
        Ok(wire::reshape_products(data.products))
    }
}

#[async_trait]
impl CommerceBackend for ShopifyClient {
    #[instrument(skip(self))]
    async fn get_page(&self, handle: &str) -> Result<Option<Page>, BackendError> {
        let data: PageData = self
            .read(
                "getPage",
                queries::GET_PAGE,
                json!({ "handle": handle }),
                &[TAG_PAGES],
                Some("page"),
            )
            .await?;
        Ok(data.page)
    }

    #[instrument(skip(self))]
    async fn get_pages(&self) -> Result<Vec<Page>, BackendError> {
        let data: PagesData = self
            .read("getPages", queries::GET_PAGES, json!({}), &[TAG_PAGES], None)
            .await?;
        Ok(data.pages.into_nodes())
    }

    #[instrument(skip(self))]
    async fn get_product(&self, handle: &str) -> Result<Option<Product>, BackendError> {
        let data: ProductData = self
            .read(
                "getProduct",
                queries::GET_PRODUCT,
                json!({ "handle": handle }),
                &[TAG_PRODUCTS],
                Some("product"),
            )
            .await?;
        Ok(data.product.and_then(wire::WireProduct::reshape))
    }

    #[instrument(skip(self))]
    async fn get_products(&self, query: ProductQuery) -> Result<Vec<Product>, BackendError> {
        Ok(self.fetch_products(query).await?)
    }

    #[instrument(skip(self))]
    async fn get_collection(&self, handle: &str) -> Result<Option<Collection>, BackendError> {
        let data: CollectionData = self
            .read(
                "getCollection",
                queries::GET_COLLECTION,
                json!({ "handle": handle }),
                &[TAG_COLLECTIONS],
                Some("collection"),
            )
            .await?;
        Ok(data.collection)
    }

    #[instrument(skip(self))]
    async fn get_collections(&self) -> Result<Vec<Collection>, BackendError> {
        let data: CollectionsData = self
            .read(
                "getCollections",
                queries::GET_COLLECTIONS,
                json!({}),
                &[TAG_COLLECTIONS],
                None,
            )
            .await?;
        Ok(wire::visible_collections(data.collections))
    }

    /// Unknown collections list no products.
    #[instrument(skip(self))]
    async fn get_collection_products(
        &self,
        handle: &str,
        query: ProductQuery,
    ) -> Result<Vec<Product>, BackendError> {
        let variables = json!({
            "handle": handle,
            "sortKey": query.sort_key.map(collection_sort_key),
            "reverse": query.reverse,
        });
        let data: CollectionProductsData = self
            .read(
                "getCollectionProducts",
                queries::GET_COLLECTION_PRODUCTS,
                variables,
                &[TAG_COLLECTIONS, TAG_PRODUCTS],
                Some("collection"),
            )
            .await?;
        Ok(data
            .collection
            .map(|c| wire::reshape_products(c.products))
            .unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn get_cart(&self, cart_id: &str) -> Result<Option<Cart>, BackendError> {
        let data = self
            .execute(queries::GET_CART, &json!({ "cartId": cart_id }))
            .await?;
        let data: CartData = serde_json::from_value(data).map_err(ShopifyError::from)?;
        Ok(data.cart.map(Cart::from))
    }

    #[instrument(skip_all)]
    async fn create_cart(&self, lines: Vec<CartLineInput>) -> Result<Cart, BackendError> {
        Ok(self
            .mutate(queries::CREATE_CART, json!({ "lineItems": lines }))
            .await?)
    }

    #[instrument(skip(self, lines))]
    async fn add_to_cart(
        &self,
        cart_id: &str,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, BackendError> {
        Ok(self
            .mutate(
                queries::ADD_TO_CART,
                json!({ "cartId": cart_id, "lines": lines }),
            )
            .await?)
    }

    #[instrument(skip(self, line_ids))]
    async fn remove_from_cart(
        &self,
        cart_id: &str,
        line_ids: Vec<String>,
    ) -> Result<Cart, BackendError> {
        Ok(self
            .mutate(
                queries::REMOVE_FROM_CART,
                json!({ "cartId": cart_id, "lineIds": line_ids }),
            )
            .await?)
    }

    #[instrument(skip(self, lines))]
    async fn update_cart(
        &self,
        cart_id: &str,
        lines: Vec<CartLineUpdate>,
    ) -> Result<Cart, BackendError> {
        Ok(self
            .mutate(
                queries::UPDATE_CART,
                json!({ "cartId": cart_id, "lines": lines }),
            )
            .await?)
    }

    fn revalidate(&self, request: RevalidateRequest) -> RevalidateOutcome {
        revalidate::revalidate(&request, self.revalidation_secret.as_ref(), &self.cache)
    }
}
