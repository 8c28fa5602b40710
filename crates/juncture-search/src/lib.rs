//! Site search for the Juncture gateway.
//!
//! Search queries are forwarded to a hosted custom-search API together with
//! the site's credentials. Responses are memoized in memory for the life of
//! the process:
//!
//! - [`SearchGateway`]: merges credentials, builds the upstream URL, caches
//! - [`SearchCache`]: URL-keyed response store
//!
//! # Cache Keys
//!
//! The key is the full upstream URL, compared as a string. `?q=a&cx=1` and
//! `?cx=1&q=a` are different keys even though they ask the same question.

mod cache;

pub use cache::SearchCache;

use std::collections::HashSet;
use std::sync::Arc;

use juncture_upstream::{Upstream, UpstreamError, url_with_query};
use tracing::{debug, warn};

/// Hosted search API queried by default.
pub const SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Error from a search request.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Search API answered with a non-200 status.
    #[error("search API returned status {0}")]
    Status(u16),

    /// Search API could not be reached or returned invalid JSON.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Credentials sent with every search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCredentials {
    /// API key.
    pub key: String,
    /// Search engine identifier.
    pub cx: String,
}

/// Merge credentials with inbound query parameters.
///
/// Credentials come first. An inbound parameter with the same name replaces
/// the credential's value in place; for repeated inbound names the first
/// value wins. Remaining inbound parameters follow in request order.
pub fn merge_params(
    credentials: &SearchCredentials,
    inbound: &[(String, String)],
) -> Vec<(String, String)> {
    let mut merged = vec![
        ("key".to_owned(), credentials.key.clone()),
        ("cx".to_owned(), credentials.cx.clone()),
    ];
    let mut seen = HashSet::new();

    for (name, value) in inbound {
        if !seen.insert(name.as_str()) {
            continue;
        }
        if let Some(slot) = merged.iter_mut().find(|(existing, _)| *existing == *name) {
            slot.1.clone_from(value);
        } else {
            merged.push((name.clone(), value.clone()));
        }
    }

    merged
}

/// Search API client with a response cache.
pub struct SearchGateway {
    credentials: SearchCredentials,
    upstream: Arc<dyn Upstream>,
    cache: SearchCache,
}

impl SearchGateway {
    /// Create a gateway using [`SEARCH_ENDPOINT`].
    #[must_use]
    pub fn new(
        credentials: SearchCredentials,
        upstream: Arc<dyn Upstream>,
        cache: SearchCache,
    ) -> Self {
        Self {
            credentials,
            upstream,
            cache,
        }
    }

    /// Response cache.
    #[must_use]
    pub fn cache(&self) -> &SearchCache {
        &self.cache
    }

    /// Run a search, serving repeated URLs from the cache.
    ///
    /// Only a 200 response with a valid JSON body is cached. Two concurrent
    /// misses for the same URL both reach the API; the later write wins.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Status`] for a non-200 answer and
    /// [`SearchError::Upstream`] if the API is unreachable or the body is not
    /// JSON.
    pub fn search(
        &self,
        inbound: &[(String, String)],
    ) -> Result<serde_json::Value, SearchError> {
        let params = merge_params(&self.credentials, inbound);
        let url = url_with_query(SEARCH_ENDPOINT, &params)?;

        if let Some(cached) = self.cache.get(&url) {
            debug!(url = %url, "Search cache hit");
            return Ok(cached);
        }

        debug!(url = %url, "Search cache miss");
        let response = self.upstream.get(&url)?;
        if !response.is_ok() {
            warn!(status = response.status, "Search API request failed");
            return Err(SearchError::Status(response.status));
        }

        let value: serde_json::Value = response.json()?;
        self.cache.insert(url, value.clone());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use juncture_upstream::MockUpstream;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn credentials() -> SearchCredentials {
        SearchCredentials {
            key: "k".to_owned(),
            cx: "engine".to_owned(),
        }
    }

    fn gateway(upstream: &Arc<MockUpstream>) -> SearchGateway {
        SearchGateway::new(
            credentials(),
            Arc::clone(upstream) as Arc<dyn Upstream>,
            SearchCache::unbounded(),
        )
    }

    #[test]
    fn test_merge_params_credentials_first() {
        let merged = merge_params(&credentials(), &pairs(&[("q", "maps")]));
        assert_eq!(merged, pairs(&[("key", "k"), ("cx", "engine"), ("q", "maps")]));
    }

    #[test]
    fn test_merge_params_inbound_wins_in_place() {
        let merged = merge_params(&credentials(), &pairs(&[("q", "maps"), ("cx", "other")]));
        assert_eq!(merged, pairs(&[("key", "k"), ("cx", "other"), ("q", "maps")]));
    }

    #[test]
    fn test_merge_params_first_inbound_value_wins() {
        let merged = merge_params(&credentials(), &pairs(&[("q", "a"), ("q", "b")]));
        assert_eq!(merged, pairs(&[("key", "k"), ("cx", "engine"), ("q", "a")]));
    }

    #[test]
    fn test_identical_queries_hit_cache() {
        let upstream = Arc::new(MockUpstream::new().with_response(
            SEARCH_ENDPOINT,
            200,
            r#"{"items": [{"title": "Maps"}]}"#,
        ));
        let gateway = gateway(&upstream);

        let first = gateway.search(&pairs(&[("q", "maps")])).unwrap();
        let second = gateway.search(&pairs(&[("q", "maps")])).unwrap();

        assert_eq!(first, json!({"items": [{"title": "Maps"}]}));
        assert_eq!(first, second);
        assert_eq!(upstream.call_count(), 1);
        assert_eq!(
            upstream.calls()[0].url,
            "https://www.googleapis.com/customsearch/v1?key=k&cx=engine&q=maps"
        );
    }

    #[test]
    fn test_parameter_order_is_part_of_key() {
        let upstream = Arc::new(MockUpstream::new().with_response(SEARCH_ENDPOINT, 200, "{}"));
        let gateway = gateway(&upstream);

        gateway.search(&pairs(&[("q", "a"), ("start", "1")])).unwrap();
        gateway.search(&pairs(&[("start", "1"), ("q", "a")])).unwrap();

        assert_eq!(upstream.call_count(), 2);
        assert_eq!(gateway.cache().len(), 2);
    }

    #[test]
    fn test_inbound_credential_keeps_credential_position() {
        // `cx` is a credential, so both orders overwrite it in place and
        // produce the same URL.
        let upstream = Arc::new(MockUpstream::new().with_response(SEARCH_ENDPOINT, 200, "{}"));
        let gateway = gateway(&upstream);

        gateway.search(&pairs(&[("q", "a"), ("cx", "1")])).unwrap();
        gateway.search(&pairs(&[("cx", "1"), ("q", "a")])).unwrap();

        assert_eq!(upstream.call_count(), 1);
        assert_eq!(gateway.cache().len(), 1);
        assert_eq!(
            upstream.calls()[0].url,
            "https://www.googleapis.com/customsearch/v1?key=k&cx=1&q=a"
        );
    }

    #[test]
    fn test_non_200_is_not_cached() {
        let upstream = Arc::new(MockUpstream::new().with_response(
            SEARCH_ENDPOINT,
            429,
            r#"{"error": {}}"#,
        ));
        let gateway = gateway(&upstream);

        let err = gateway.search(&pairs(&[("q", "maps")])).unwrap_err();
        assert!(matches!(err, SearchError::Status(429)));

        gateway.search(&pairs(&[("q", "maps")])).unwrap_err();
        assert_eq!(upstream.call_count(), 2);
        assert!(gateway.cache().is_empty());
    }

    #[test]
    fn test_invalid_json_is_not_cached() {
        let upstream =
            Arc::new(MockUpstream::new().with_response(SEARCH_ENDPOINT, 200, "<html>oops"));
        let gateway = gateway(&upstream);

        let err = gateway.search(&pairs(&[("q", "maps")])).unwrap_err();

        assert!(matches!(err, SearchError::Upstream(UpstreamError::Json(_))));
        assert!(gateway.cache().is_empty());
    }
}
