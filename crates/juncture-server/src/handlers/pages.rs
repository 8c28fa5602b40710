//! Page rendering endpoint.
//!
//! Every request not claimed by another route lands here, whatever its
//! method. The rendered HTML is returned with the rendering service's status.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use juncture_render::RequestContext;

use crate::error::ServerError;
use crate::handlers::logical_path;
use crate::state::AppState;

/// Handle `/` and `/{*path}`.
pub(crate) async fn render_page(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, ServerError> {
    let ctx = RequestContext::new(&logical_path(&uri)?, params);

    let worker = Arc::clone(&state);
    let result = tokio::task::spawn_blocking(move || worker.renderer.render(&ctx)).await??;

    let status = StatusCode::from_u16(result.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let html = if result.html.is_empty() || state.rewriter.is_identity() {
        result.html
    } else {
        state.rewriter.rewrite(&result.html).into_owned()
    };

    Ok((status, Html(html)).into_response())
}
