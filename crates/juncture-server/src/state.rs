//! Application state.
//!
//! Shared state for all request handlers.

use std::sync::Arc;

use juncture_content::StaticAssetProxy;
use juncture_render::{RenderClient, ResponseRewriter};
use juncture_search::{SearchCache, SearchGateway};
use juncture_upstream::Upstream;

use crate::ServerConfig;

/// Application state shared across all handlers.
///
/// Every collaborator is built once at startup; only the search cache
/// changes while serving.
pub(crate) struct AppState {
    /// Client for the markdown rendering service.
    pub(crate) renderer: RenderClient,
    /// Bundle URL rewriting applied to rendered pages.
    pub(crate) rewriter: ResponseRewriter,
    /// Root-level static files.
    pub(crate) assets: StaticAssetProxy,
    /// Cached search API proxy.
    pub(crate) search: SearchGateway,
}

impl AppState {
    /// Build state from configuration, sharing one upstream client.
    pub(crate) fn new(config: &ServerConfig, upstream: Arc<dyn Upstream>) -> Self {
        Self {
            renderer: RenderClient::new(
                &config.render_endpoint,
                config.content.clone(),
                Arc::clone(&upstream),
            ),
            rewriter: ResponseRewriter::from_config(&config.assets),
            assets: StaticAssetProxy::new(config.content.clone(), Arc::clone(&upstream)),
            search: SearchGateway::new(
                config.search_credentials.clone(),
                upstream,
                SearchCache::with_capacity(config.search_cache_capacity),
            ),
        }
    }
}
