//! In-memory search response cache.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::warn;

/// URL-keyed store of decoded search responses.
///
/// Entries never expire. Without a capacity the map grows for the life of
/// the process; with one, new keys are refused once it is full while existing
/// keys may still be overwritten.
#[derive(Debug)]
pub struct SearchCache {
    entries: RwLock<HashMap<String, serde_json::Value>>,
    capacity: Option<usize>,
}

impl SearchCache {
    /// Create a cache that never refuses entries.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::with_capacity(None)
    }

    /// Create a cache holding at most `capacity` keys (`None` for no limit).
    #[must_use]
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Look up a response by exact URL.
    pub fn get(&self, url: &str) -> Option<serde_json::Value> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
    }

    /// Store a response under `url`.
    ///
    /// Returns `false` if the key was new and the cache is full.
    pub fn insert(&self, url: String, value: serde_json::Value) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(capacity) = self.capacity
            && entries.len() >= capacity
            && !entries.contains_key(&url)
        {
            warn!(capacity, "Search cache full, response not cached");
            return false;
        }

        entries.insert(url, value);
        true
    }

    /// Number of cached responses.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SearchCache {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_keys_are_exact_strings() {
        let cache = SearchCache::unbounded();
        cache.insert("https://s.test/v1?q=a&cx=1".to_owned(), json!({"n": 1}));
        cache.insert("https://s.test/v1?cx=1&q=a".to_owned(), json!({"n": 2}));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("https://s.test/v1?q=a&cx=1"), Some(json!({"n": 1})));
        assert_eq!(cache.get("https://s.test/v1?cx=1&q=a"), Some(json!({"n": 2})));
        assert_eq!(cache.get("https://s.test/v1?q=a"), None);
    }

    #[test]
    fn test_overwrite_same_key() {
        let cache = SearchCache::unbounded();
        cache.insert("u".to_owned(), json!(1));
        cache.insert("u".to_owned(), json!(2));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("u"), Some(json!(2)));
    }

    #[test]
    fn test_capacity_refuses_new_keys() {
        let cache = SearchCache::with_capacity(Some(1));

        assert!(cache.insert("a".to_owned(), json!(1)));
        assert!(!cache.insert("b".to_owned(), json!(2)));
        assert!(cache.insert("a".to_owned(), json!(3)));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a"), Some(json!(3)));
        assert_eq!(cache.get("b"), None);
    }

    #[test]
    fn test_empty() {
        let cache = SearchCache::default();
        assert!(cache.is_empty());
        assert_eq!(cache.get("anything"), None);
    }
}
