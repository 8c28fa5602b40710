//! Static file serving.
//!
//! `/favicon.ico`, `/robots.txt`, and `/sitemap.txt` are read from the local
//! mirror or proxied from the raw content host, with a MIME type taken from
//! the extension.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};

use crate::error::ServerError;
use crate::state::AppState;

/// Root-level files served from the content source.
pub(crate) const STATIC_PATHS: [&str; 3] = ["/favicon.ico", "/robots.txt", "/sitemap.txt"];

/// Serve one of [`STATIC_PATHS`].
pub(crate) async fn serve_static(
    State(state): State<Arc<AppState>>,
    uri: Uri,
) -> Result<Response, ServerError> {
    let path = uri.path().to_owned();
    let asset = tokio::task::spawn_blocking(move || state.assets.serve(&path)).await??;

    let status = StatusCode::from_u16(asset.status).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok((status, [(header::CONTENT_TYPE, asset.mime)], asset.body).into_response())
}
