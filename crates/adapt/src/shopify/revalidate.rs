// crates/adapt/src/shopify/revalidate.rs

use crate::cache::TaggedCache;
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serve::backend::{RevalidateOutcome, RevalidateRequest};

pub const TAG_COLLECTIONS: &str = "collections";
pub const TAG_PRODUCTS: &str = "products";
pub const TAG_PAGES: &str = "pages";

/// Cache tag invalidated by a webhook topic such as `products/update`.
pub fn tag_for_topic(topic: &str) -> Option<&'static str> {
    match topic.split_once('/').map(|(resource, _)| resource) {
        Some("collections") => Some(TAG_COLLECTIONS),
        Some("products") => Some(TAG_PRODUCTS),
        Some("pages") => Some(TAG_PAGES),
        _ => None,
    }
}

/// Check the shared secret, then drop the cached reads named by the topic.
///
/// Without a configured secret every request is unauthorized.
pub fn revalidate(
    request: &RevalidateRequest,
    secret: Option<&SecretString>,
    cache: &TaggedCache,
) -> RevalidateOutcome {
    let authorized = match (secret, request.secret.as_deref()) {
        (Some(expected), Some(given)) => expected.expose_secret() == given,
        _ => false,
    };
    if !authorized {
        tracing::warn!("revalidation rejected: bad or missing secret");
        return RevalidateOutcome::Unauthorized;
    }

    let Some(tag) = request.topic.as_deref().and_then(tag_for_topic) else {
        tracing::debug!(topic = ?request.topic, "revalidation topic ignored");
        return RevalidateOutcome::Ignored;
    };

    let dropped = cache.invalidate(tag);
    tracing::info!(tag, dropped, "revalidated");
    RevalidateOutcome::Revalidated {
        tags: vec![tag.to_owned()],
        now: Utc::now().timestamp_millis(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(topic: &str, secret: &str) -> RevalidateRequest {
        RevalidateRequest {
            topic: Some(topic.into()),
            secret: Some(secret.into()),
        }
    }

    fn seeded() -> TaggedCache {
        let cache = TaggedCache::default();
        cache.insert("getProduct:mug", &[TAG_PRODUCTS], json!({}));
        cache.insert("getCollection:summer", &[TAG_COLLECTIONS], json!({}));
        cache
    }

    #[test]
    fn wrong_secret_is_unauthorized_and_keeps_cache() {
        let cache = seeded();
        let secret = SecretString::from("s3cret".to_owned());
        let outcome = revalidate(&request("products/update", "nope"), Some(&secret), &cache);
        assert_eq!(outcome, RevalidateOutcome::Unauthorized);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn unconfigured_secret_rejects_everything() {
        let cache = seeded();
        let outcome = revalidate(&request("products/update", ""), None, &cache);
        assert_eq!(outcome, RevalidateOutcome::Unauthorized);
    }

    #[test]
    fn product_topic_invalidates_only_products() {
        let cache = seeded();
        let secret = SecretString::from("s3cret".to_owned());
        let outcome = revalidate(&request("products/update", "s3cret"), Some(&secret), &cache);

        assert!(matches!(
            outcome,
            RevalidateOutcome::Revalidated { ref tags, .. } if tags == &["products"]
        ));
        assert!(cache.get("getProduct:mug").is_none());
        assert!(cache.get("getCollection:summer").is_some());
    }

    #[test]
    fn unknown_topic_is_ignored() {
        let cache = seeded();
        let secret = SecretString::from("s3cret".to_owned());
        let outcome = revalidate(&request("orders/create", "s3cret"), Some(&secret), &cache);
        assert_eq!(outcome, RevalidateOutcome::Ignored);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn topics_map_by_resource() {
        assert_eq!(tag_for_topic("collections/delete"), Some("collections"));
        assert_eq!(tag_for_topic("pages/create"), Some("pages"));
        assert_eq!(tag_for_topic("products"), None);
    }
}
