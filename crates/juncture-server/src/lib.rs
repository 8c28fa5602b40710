//! HTTP server for the Juncture gateway.
//!
//! Serves a static site whose pages are markdown files, either from a hosted
//! repository or from a local mirror:
//!
//! - Page routes: markdown rendered by an external service, then rewritten
//! - `/search`: cached proxy to a hosted search API
//! - `/favicon.ico`, `/robots.txt`, `/sitemap.txt`: files from the content source
//!
//! # Quick Start
//!
//! ```ignore
//! use juncture_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         port: 8080,
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum router (juncture-server)
//!                        │
//!                        ├─► page fallback ──► RenderClient ──► rendering service
//!                        │                          └─► ResponseRewriter
//!                        │
//!                        ├─► /search ──► SearchGateway ──► search API (cached)
//!                        │
//!                        └─► static files ──► StaticAssetProxy ──► local dir / raw host
//! ```
//!
//! Upstream clients block, so every handler moves its upstream work onto
//! tokio's blocking pool.

mod app;
mod error;
mod handlers;
mod middleware;
mod state;
mod static_files;

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use juncture_config::{AssetsConfig, DEFAULT_CONTENT_SOURCE, DEFAULT_RENDER_ENDPOINT};
use juncture_content::ContentSource;
use juncture_search::SearchCredentials;
use juncture_upstream::{HttpUpstream, Upstream};
use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Where pages and static files come from.
    pub content: ContentSource,
    /// Base URL of the markdown rendering service.
    pub render_endpoint: String,
    /// Timeout for every upstream call (`None` uses the client default).
    pub upstream_timeout: Option<Duration>,
    /// Script bundle version pin and endpoint override.
    pub assets: AssetsConfig,
    /// Search API credentials.
    pub search_credentials: SearchCredentials,
    /// Maximum number of cached search responses (`None` means unbounded).
    pub search_cache_capacity: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 8000,
            content: ContentSource::RemoteRepository(DEFAULT_CONTENT_SOURCE.to_owned()),
            render_endpoint: DEFAULT_RENDER_ENDPOINT.to_owned(),
            upstream_timeout: None,
            assets: AssetsConfig::default(),
            search_credentials: SearchCredentials::default(),
            search_cache_capacity: None,
        }
    }
}

/// Run the server until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address is invalid or the listener cannot bind.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let upstream: Arc<dyn Upstream> = Arc::new(HttpUpstream::new(config.upstream_timeout));
    let state = Arc::new(AppState::new(&config, upstream));
    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(
        address = %addr,
        content = %config.content.identifier(),
        local = config.content.is_local(),
        "Starting server"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from Juncture config.
#[must_use]
pub fn server_config_from_juncture_config(config: &juncture_config::Config) -> ServerConfig {
    let content = match &config.content_resolved.local_dir {
        Some(dir) => ContentSource::LocalDirectory(dir.clone()),
        None => ContentSource::RemoteRepository(config.content_resolved.identifier.clone()),
    };

    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        content,
        render_endpoint: config.render.endpoint.clone(),
        upstream_timeout: config.render.timeout_secs.map(Duration::from_secs),
        assets: config.assets.clone(),
        search_credentials: SearchCredentials {
            key: config.search.key.clone(),
            cx: config.search.cx.clone(),
        },
        search_cache_capacity: config.search.cache_capacity,
    }
}
