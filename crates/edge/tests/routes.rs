// crates/edge/tests/routes.rs

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use domain::{
    cms::{Story, StoryPage, StoryQuery, Version},
    commerce::{Cart, CartLineInput, CartLineUpdate, Collection, Page, Product, ProductQuery},
    setting::{FallbackPolicy, SiteSettings},
};
use edge::{router, AppState, Backends, StateConfig};
use parking_lot::Mutex;
use secrecy::SecretString;
use serde_json::{json, Value};
use serve::backend::{
    BackendError, CommerceBackend, MailingList, RevalidateOutcome, RevalidateRequest,
    StoryBackend,
};
use std::{collections::HashMap, sync::Arc};
use tower::ServiceExt;

// ─────────────────────────────────────────────────────────────────────────────
// In-memory backends
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct FakeCommerce {
    pages: HashMap<String, Page>,
    failing: bool,
    created: Mutex<Vec<CartLineInput>>,
}

const EXPIRED_CART: &str = "gid://shopify/Cart/expired";

fn cart(id: &str) -> Cart {
    serde_json::from_value(json!({
        "id": id,
        "checkoutUrl": "https://shop.example/checkout",
        "cost": {
            "subtotalAmount": {"amount": "0.0", "currencyCode": "USD"},
            "totalAmount": {"amount": "0.0", "currencyCode": "USD"}
        },
        "lines": [],
        "totalQuantity": 0
    }))
    .unwrap()
}

#[async_trait]
impl CommerceBackend for FakeCommerce {
    async fn get_page(&self, handle: &str) -> Result<Option<Page>, BackendError> {
        if self.failing {
            return Err(BackendError::Transport("connection reset".into()));
        }
        Ok(self.pages.get(handle).cloned())
    }

    async fn get_pages(&self) -> Result<Vec<Page>, BackendError> {
        Ok(self.pages.values().cloned().collect())
    }

    async fn get_product(&self, _handle: &str) -> Result<Option<Product>, BackendError> {
        Ok(None)
    }

    async fn get_products(&self, _query: ProductQuery) -> Result<Vec<Product>, BackendError> {
        Ok(vec![])
    }

    async fn get_collection(&self, _handle: &str) -> Result<Option<Collection>, BackendError> {
        Ok(None)
    }

    async fn get_collections(&self) -> Result<Vec<Collection>, BackendError> {
        Ok(vec![])
    }

    async fn get_collection_products(
        &self,
        _handle: &str,
        _query: ProductQuery,
    ) -> Result<Vec<Product>, BackendError> {
        Ok(vec![])
    }

    async fn get_cart(&self, cart_id: &str) -> Result<Option<Cart>, BackendError> {
        Ok((cart_id != EXPIRED_CART).then(|| cart(cart_id)))
    }

    async fn create_cart(&self, lines: Vec<CartLineInput>) -> Result<Cart, BackendError> {
        self.created.lock().extend(lines);
        Ok(cart("gid://shopify/Cart/new"))
    }

    async fn add_to_cart(
        &self,
        cart_id: &str,
        _lines: Vec<CartLineInput>,
    ) -> Result<Cart, BackendError> {
        if cart_id == EXPIRED_CART {
            return Err(BackendError::Api("cart not found".into()));
        }
        Ok(cart(cart_id))
    }

    async fn remove_from_cart(
        &self,
        cart_id: &str,
        _line_ids: Vec<String>,
    ) -> Result<Cart, BackendError> {
        Ok(cart(cart_id))
    }

    async fn update_cart(
        &self,
        cart_id: &str,
        _lines: Vec<CartLineUpdate>,
    ) -> Result<Cart, BackendError> {
        Ok(cart(cart_id))
    }

    fn revalidate(&self, request: RevalidateRequest) -> RevalidateOutcome {
        if request.secret.as_deref() != Some("hook-secret") {
            return RevalidateOutcome::Unauthorized;
        }
        match request.topic.as_deref() {
            Some(t) if t.starts_with("products/") => RevalidateOutcome::Revalidated {
                tags: vec!["products".into()],
                now: 1,
            },
            _ => RevalidateOutcome::Ignored,
        }
    }
}

#[derive(Default)]
struct FakeStories {
    stories: HashMap<String, Story>,
}

#[async_trait]
impl StoryBackend for FakeStories {
    async fn get_story(&self, slug: &str, _version: Version) -> Result<Option<Story>, BackendError> {
        Ok(self.stories.get(slug).cloned())
    }

    async fn get_stories(&self, query: StoryQuery) -> Result<StoryPage, BackendError> {
        let stories: Vec<Story> = self
            .stories
            .values()
            .filter(|s| s.full_slug.starts_with(&query.starts_with))
            .cloned()
            .collect();
        Ok(StoryPage {
            total: stories.len() as u64,
            per_page: query.per_page,
            stories,
        })
    }
}

#[derive(Default)]
struct FakeList {
    failing: bool,
    emails: Mutex<Vec<String>>,
}

#[async_trait]
impl MailingList for FakeList {
    async fn subscribe(&self, email: &str) -> Result<(), BackendError> {
        if self.failing {
            return Err(BackendError::Status {
                status: 400,
                message: "Member Exists".into(),
            });
        }
        self.emails.lock().push(email.to_owned());
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Fixtures
// ─────────────────────────────────────────────────────────────────────────────

fn page(handle: &str, title: &str) -> Page {
    serde_json::from_value(json!({
        "id": format!("gid://shopify/Page/{handle}"),
        "handle": handle,
        "title": title,
        "body": "<p>We ship worldwide.</p>",
        "bodySummary": "We ship worldwide.",
        "createdAt": "2024-01-01T00:00:00Z",
        "updatedAt": "2024-02-03T00:00:00Z"
    }))
    .unwrap()
}

fn story(slug: &str, name: &str, body: Value) -> Story {
    serde_json::from_value(json!({
        "id": 7,
        "uuid": format!("uuid-{slug}"),
        "name": name,
        "slug": slug.rsplit('/').next().unwrap(),
        "full_slug": slug,
        "content": {"_uid": "root", "component": "page", "body": body}
    }))
    .unwrap()
}

struct Harness {
    app: Router,
    list: Arc<FakeList>,
    commerce: Arc<FakeCommerce>,
}

fn harness_with(commerce: FakeCommerce, stories: FakeStories, list: FakeList, policy: FallbackPolicy) -> Harness {
    let commerce = Arc::new(commerce);
    let list = Arc::new(list);
    let backends = Backends {
        commerce: commerce.clone(),
        stories: Arc::new(stories),
        newsletter: Some(list.clone()),
    };
    let config = StateConfig {
        site: SiteSettings::default(),
        policy,
        preview_secret: Some(SecretString::from("preview-secret".to_owned())),
        bridge_script_url: "//app.storyblok.com/f/storyblok-v2-latest.js".into(),
        bridge_token: "public-token".into(),
    };
    let state = AppState::new(backends, config).unwrap();
    Harness {
        app: router::build(state),
        list,
        commerce,
    }
}

fn harness() -> Harness {
    let mut commerce = FakeCommerce::default();
    commerce
        .pages
        .insert("shipping".into(), page("shipping", "Shipping Policy"));

    let mut stories = FakeStories::default();
    for s in [
        story("shipping", "CMS Shipping", json!([])),
        story(
            "about-us",
            "About Us",
            json!([
                {"_uid": "h", "component": "hero", "headline": "Our story"},
                {"_uid": "x", "component": "mystery_widget", "color": "teal"},
                {"_uid": "p", "component": "product_spotlight", "product_handle": "ghost"}
            ]),
        ),
        story("blog/launch", "We launched", json!([])),
    ] {
        stories.stories.insert(s.full_slug.clone(), s);
    }

    harness_with(commerce, stories, FakeList::default(), FallbackPolicy::Lenient)
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn get(app: &Router, uri: &str) -> Response {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post_json(app: &Router, uri: &str, body: &str) -> Response {
    send(
        app,
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap(),
    )
    .await
}

async fn text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn json_body(response: Response) -> Value {
    serde_json::from_str(&text(response).await).unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Pages
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn commerce_page_wins_over_story() {
    let h = harness();
    let res = get(&h.app, "/shipping").await;
    assert_eq!(res.status(), StatusCode::OK);
    let html = text(res).await;
    assert!(html.contains("<title>Shipping Policy</title>"));
    assert!(html.contains("This document was last updated on February 3, 2024."));
    assert!(!html.contains("CMS Shipping"));
}

#[tokio::test]
async fn story_renders_blocks_in_order_with_placeholders() {
    let h = harness();
    let res = get(&h.app, "/about-us").await;
    assert_eq!(res.status(), StatusCode::OK);
    let cache = res.headers()[header::CACHE_CONTROL].to_str().unwrap().to_owned();
    assert!(cache.starts_with("public, s-maxage="));

    let html = text(res).await;
    assert!(html.contains("<title>About Us</title>"));
    let hero = html.find("Our story").unwrap();
    let placeholder = html.find("Unregistered Component: mystery_widget").unwrap();
    let missing = html.find("Product not found: ghost").unwrap();
    assert!(hero < placeholder && placeholder < missing);
    assert!(!html.contains("data-preview-bridge"));
}

#[tokio::test]
async fn preview_param_injects_bridge_and_disables_caching() {
    let h = harness();
    let res = get(&h.app, "/about-us?_storyblok=").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::CACHE_CONTROL], "no-store");
    assert!(text(res).await.contains("data-preview-bridge"));
}

#[tokio::test]
async fn unknown_slug_is_not_found() {
    let h = harness();
    let res = get(&h.app, "/does-not-exist").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(text(res).await.contains("<title>Page Not Found</title>"));
}

#[tokio::test]
async fn failing_source_falls_through_when_lenient() {
    let mut stories = FakeStories::default();
    let s = story("faq", "FAQ", json!([]));
    stories.stories.insert(s.full_slug.clone(), s);
    let commerce = FakeCommerce {
        failing: true,
        ..FakeCommerce::default()
    };

    let h = harness_with(commerce, stories, FakeList::default(), FallbackPolicy::Lenient);
    assert_eq!(get(&h.app, "/faq").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn failing_source_is_bad_gateway_when_strict() {
    let mut stories = FakeStories::default();
    let s = story("faq", "FAQ", json!([]));
    stories.stories.insert(s.full_slug.clone(), s);
    let commerce = FakeCommerce {
        failing: true,
        ..FakeCommerce::default()
    };

    let h = harness_with(commerce, stories, FakeList::default(), FallbackPolicy::Strict);
    assert_eq!(get(&h.app, "/faq").await.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn missing_home_story_is_an_error_page() {
    let h = harness();
    let res = get(&h.app, "/").await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(text(res).await.contains("Something went wrong"));
}

#[tokio::test]
async fn blog_index_and_posts() {
    let h = harness();
    let html = text(get(&h.app, "/blog").await).await;
    assert!(html.contains(r#"href="/blog/launch""#));

    let res = get(&h.app, "/blog/launch").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(text(res).await.contains("<title>We launched</title>"));
}

#[tokio::test]
async fn social_image_is_svg_with_title() {
    let h = harness();
    let res = get(&h.app, "/about-us/opengraph-image").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "image/svg+xml");
    assert!(text(res).await.contains("About Us"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Newsletter
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn newsletter_rejects_email_without_at() {
    let h = harness();
    let res = post_json(&h.app, "/api/newsletter", r#"{"email": "nobody"}"#).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(res).await, json!({"error": "Valid email is required"}));
    assert!(h.list.emails.lock().is_empty());
}

#[tokio::test]
async fn newsletter_rejects_malformed_body() {
    let h = harness();
    let res = post_json(&h.app, "/api/newsletter", "{not json").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(res).await, json!({"error": "Invalid request body"}));
}

#[tokio::test]
async fn newsletter_forwards_valid_email() {
    let h = harness();
    let res = post_json(&h.app, "/api/newsletter", r#"{"email": "ada@example.com"}"#).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await, json!({"success": true}));
    assert_eq!(*h.list.emails.lock(), vec!["ada@example.com".to_owned()]);
}

#[tokio::test]
async fn newsletter_provider_failure_is_500() {
    let list = FakeList {
        failing: true,
        ..FakeList::default()
    };
    let h = harness_with(
        FakeCommerce::default(),
        FakeStories::default(),
        list,
        FallbackPolicy::Lenient,
    );
    let res = post_json(&h.app, "/api/newsletter", r#"{"email": "ada@example.com"}"#).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(res).await, json!({"error": "Failed to subscribe"}));
}

// ─────────────────────────────────────────────────────────────────────────────
// Preview entry
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn preview_with_wrong_secret_is_unauthorized_regardless_of_slug() {
    let h = harness();
    for uri in [
        "/api/preview?secret=nope&slug=about-us",
        "/api/preview?secret=nope",
        "/api/preview?slug=about-us",
    ] {
        let res = get(&h.app, uri).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(text(res).await, "Invalid token");
    }
}

#[tokio::test]
async fn preview_requires_slug_and_existing_story() {
    let h = harness();
    let res = get(&h.app, "/api/preview?secret=preview-secret").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(text(res).await, "Missing slug");

    let res = get(&h.app, "/api/preview?secret=preview-secret&slug=ghost").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(text(res).await, "Story not found");
}

#[tokio::test]
async fn preview_redirects_into_preview_mode() {
    let h = harness();
    let res = get(&h.app, "/api/preview?secret=preview-secret&slug=about-us").await;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = res.headers()[header::LOCATION].to_str().unwrap();
    assert!(location.starts_with("/about-us?_storyblok="));
}

// ─────────────────────────────────────────────────────────────────────────────
// Revalidation and cart
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn revalidate_checks_secret_then_topic() {
    let h = harness();
    let request = |secret: &str, topic: &str| {
        Request::post(format!("/api/revalidate?secret={secret}"))
            .header("x-shopify-topic", topic)
            .body(Body::empty())
            .unwrap()
    };

    let res = send(&h.app, request("wrong", "products/update")).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = send(&h.app, request("hook-secret", "products/update")).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        json_body(res).await,
        json!({"status": 200, "revalidated": true, "now": 1})
    );

    let res = send(&h.app, request("hook-secret", "orders/create")).await;
    assert_eq!(json_body(res).await, json!({"status": 200}));
}

#[tokio::test]
async fn adding_to_cart_without_cookie_creates_one() {
    let h = harness();
    let res = post_json(
        &h.app,
        "/api/cart/lines",
        r#"{"lines": [{"merchandiseId": "gid://shopify/ProductVariant/1", "quantity": 2}]}"#,
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = res.headers()[header::SET_COOKIE].to_str().unwrap().to_owned();
    assert!(cookie.starts_with("cartId=gid://shopify/Cart/new"));
    assert_eq!(h.commerce.created.lock().len(), 1);

    let body = json_body(res).await;
    assert_eq!(body["id"], "gid://shopify/Cart/new");
}

fn add_lines_with_cookie(cart_id: &str) -> Request<Body> {
    Request::post("/api/cart/lines")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, format!("cartId={cart_id}"))
        .body(Body::from(
            r#"{"lines": [{"merchandiseId": "gid://shopify/ProductVariant/1", "quantity": 1}]}"#,
        ))
        .unwrap()
}

#[tokio::test]
async fn adding_to_existing_cart_keeps_it() {
    let h = harness();
    let res = send(&h.app, add_lines_with_cookie("gid://shopify/Cart/live")).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(h.commerce.created.lock().is_empty());
    assert_eq!(json_body(res).await["id"], "gid://shopify/Cart/live");
}

#[tokio::test]
async fn stale_cart_cookie_gets_a_new_cart() {
    let h = harness();
    let res = send(&h.app, add_lines_with_cookie(EXPIRED_CART)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = res.headers()[header::SET_COOKIE].to_str().unwrap().to_owned();
    assert!(cookie.starts_with("cartId=gid://shopify/Cart/new"));
    assert_eq!(h.commerce.created.lock().len(), 1);
    assert_eq!(json_body(res).await["id"], "gid://shopify/Cart/new");
}

#[tokio::test]
async fn cart_without_cookie_is_null() {
    let h = harness();
    let res = get(&h.app, "/api/cart").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await, Value::Null);
}
