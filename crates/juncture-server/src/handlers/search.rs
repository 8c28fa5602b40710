//! Site search endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};

use crate::error::ServerError;
use crate::state::AppState;

/// Handle GET /search.
///
/// Query parameters are passed through to the search API after the site
/// credentials; the API's JSON is returned unchanged.
pub(crate) async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let value = tokio::task::spawn_blocking(move || state.search.search(&params)).await??;
    Ok(Json(value))
}
