// crates/serve/src/backend.rs

//! Seams to the remote content sources.
//!
//! The rendering pipeline only knows these traits. Concrete HTTP clients are
//! constructed at start-up in the binary and injected as `Arc<dyn ...>`.
//!
//! Lookups return `Ok(None)` for a legitimate absence and `Err` for a transport
//! or upstream failure, so callers can tell the two apart.

use async_trait::async_trait;
use domain::{
    cms::{Story, StoryPage, StoryQuery, Version},
    commerce::{Cart, CartLineInput, CartLineUpdate, Collection, Page, Product, ProductQuery},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    /// The request never produced a response (DNS, TLS, connection reset...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success HTTP status.
    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    /// The backend answered but reported errors in the payload.
    #[error("api error: {0}")]
    Api(String),

    /// The payload did not have the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Commerce
// ─────────────────────────────────────────────────────────────────────────────

/// Inbound cache-invalidation webhook, as received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevalidateRequest {
    /// Webhook topic, e.g. `products/update`.
    pub topic: Option<String>,
    /// Shared secret from the query string.
    pub secret: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum RevalidateOutcome {
    Unauthorized,
    /// Topic does not map to any cached resource.
    Ignored,
    Revalidated { tags: Vec<String>, now: i64 },
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommerceBackend: Send + Sync {
    async fn get_page(&self, handle: &str) -> Result<Option<Page>, BackendError>;

    async fn get_pages(&self) -> Result<Vec<Page>, BackendError>;

    async fn get_product(&self, handle: &str) -> Result<Option<Product>, BackendError>;

    async fn get_products(&self, query: ProductQuery) -> Result<Vec<Product>, BackendError>;

    async fn get_collection(&self, handle: &str) -> Result<Option<Collection>, BackendError>;

    async fn get_collections(&self) -> Result<Vec<Collection>, BackendError>;

    async fn get_collection_products(
        &self,
        handle: &str,
        query: ProductQuery,
    ) -> Result<Vec<Product>, BackendError>;

    async fn get_cart(&self, cart_id: &str) -> Result<Option<Cart>, BackendError>;

    async fn create_cart(&self, lines: Vec<CartLineInput>) -> Result<Cart, BackendError>;

    async fn add_to_cart(
        &self,
        cart_id: &str,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, BackendError>;

    async fn remove_from_cart(
        &self,
        cart_id: &str,
        line_ids: Vec<String>,
    ) -> Result<Cart, BackendError>;

    async fn update_cart(
        &self,
        cart_id: &str,
        lines: Vec<CartLineUpdate>,
    ) -> Result<Cart, BackendError>;

    /// Invalidate cached reads for the resources named by the webhook topic.
    fn revalidate(&self, request: RevalidateRequest) -> RevalidateOutcome;
}

// ─────────────────────────────────────────────────────────────────────────────
// CMS
// ─────────────────────────────────────────────────────────────────────────────

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoryBackend: Send + Sync {
    async fn get_story(&self, slug: &str, version: Version) -> Result<Option<Story>, BackendError>;

    async fn get_stories(&self, query: StoryQuery) -> Result<StoryPage, BackendError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Mailing list
// ─────────────────────────────────────────────────────────────────────────────

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailingList: Send + Sync {
    async fn subscribe(&self, email: &str) -> Result<(), BackendError>;
}
