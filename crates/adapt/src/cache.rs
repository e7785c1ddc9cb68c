// crates/adapt/src/cache.rs

//! In-process response cache whose entries carry invalidation tags.

use parking_lot::RwLock;
use serde_json::Value as Json;
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone)]
struct Entry {
    tags: Vec<&'static str>,
    value: Json,
}

#[derive(Debug, Default)]
struct Entries {
    map: HashMap<String, Entry>,
    /// Insertion order, oldest first.
    order: VecDeque<String>,
}

/// Read-through cache for upstream responses.
///
/// Entries are keyed by operation and variables; `invalidate(tag)` drops every
/// entry carrying that tag. At most `capacity` entries are held; inserting
/// past that evicts the oldest. Readers never block each other.
#[derive(Debug)]
pub struct TaggedCache {
    entries: RwLock<Entries>,
    capacity: usize,
}

impl Default for TaggedCache {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl TaggedCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, key: &str) -> Option<Json> {
        self.entries.read().map.get(key).map(|e| e.value.clone())
    }

    pub fn insert(&self, key: impl Into<String>, tags: &[&'static str], value: Json) {
        if self.capacity == 0 {
            return;
        }
        let key = key.into();
        let entry = Entry {
            tags: tags.to_vec(),
            value,
        };

        let mut entries = self.entries.write();
        if entries.map.insert(key.clone(), entry).is_some() {
            return;
        }
        entries.order.push_back(key);
        while entries.map.len() > self.capacity {
            let Some(oldest) = entries.order.pop_front() else {
                break;
            };
            entries.map.remove(&oldest);
        }
    }

    /// Drop every entry tagged `tag`; returns how many were removed.
    pub fn invalidate(&self, tag: &str) -> usize {
        let mut entries = self.entries.write();
        let Entries { map, order } = &mut *entries;
        let before = map.len();
        map.retain(|_, e| !e.tags.contains(&tag));
        order.retain(|key| map.contains_key(key));
        before - map.len()
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write();
        entries.map.clear();
        entries.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn invalidate_only_touches_matching_tags() {
        let cache = TaggedCache::default();
        cache.insert("product:a", &["products"], json!({"a": 1}));
        cache.insert("collection:b", &["collections", "products"], json!({"b": 2}));
        cache.insert("page:c", &["pages"], json!({"c": 3}));

        assert_eq!(cache.invalidate("products"), 2);
        assert!(cache.get("product:a").is_none());
        assert!(cache.get("collection:b").is_none());
        assert_eq!(cache.get("page:c"), Some(json!({"c": 3})));
    }

    #[test]
    fn clear_empties() {
        let cache = TaggedCache::default();
        cache.insert("k", &["pages"], json!(null));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn oldest_entries_are_evicted_past_capacity() {
        let cache = TaggedCache::new(2);
        cache.insert("a", &["pages"], json!(1));
        cache.insert("b", &["pages"], json!(2));
        cache.insert("a", &["pages"], json!(10));
        assert_eq!(cache.len(), 2);

        cache.insert("c", &["pages"], json!(3));
        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_none());
        assert_eq!(cache.get("b"), Some(json!(2)));
        assert_eq!(cache.get("c"), Some(json!(3)));

        for i in 0..100 {
            cache.insert(format!("page:{i}"), &["pages"], json!(i));
        }
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn eviction_order_survives_invalidation() {
        let cache = TaggedCache::new(2);
        cache.insert("p", &["products"], json!(1));
        cache.insert("q", &["pages"], json!(2));
        cache.invalidate("products");

        cache.insert("r", &["pages"], json!(3));
        assert_eq!(cache.len(), 2);
        assert!(cache.get("q").is_some());

        cache.insert("s", &["pages"], json!(4));
        assert!(cache.get("q").is_none());
        assert!(cache.get("r").is_some() && cache.get("s").is_some());
    }

    #[test]
    fn zero_capacity_caches_nothing() {
        let cache = TaggedCache::new(0);
        cache.insert("k", &["pages"], json!(1));
        assert!(cache.is_empty());
    }
}
