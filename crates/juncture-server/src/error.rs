//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use juncture_search::SearchError;
use juncture_upstream::UpstreamError;
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Request path does not percent-decode to UTF-8.
    #[error("Invalid request path: {0}")]
    InvalidPath(String),

    /// Page rendering failed before a status was obtained.
    #[error("Render error: {0}")]
    Render(#[from] juncture_render::RenderError),

    /// Static file could not be read or fetched.
    #[error("Content error: {0}")]
    Content(#[from] juncture_content::ContentError),

    /// Search request failed.
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// Blocking worker panicked or was cancelled.
    #[error("Worker task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ServerError {
    /// HTTP status for this error.
    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidPath(_) => StatusCode::BAD_REQUEST,
            Self::Render(juncture_render::RenderError::Upstream(e))
            | Self::Content(juncture_content::ContentError::Upstream(e))
            | Self::Search(SearchError::Upstream(e)) => upstream_status(e),
            Self::Search(SearchError::Status(status)) => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Render(_) | Self::Content(_) | Self::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Unreachable collaborators map to 502; malformed answers to 500.
fn upstream_status(error: &UpstreamError) -> StatusCode {
    match error {
        UpstreamError::Http(_) => StatusCode::BAD_GATEWAY,
        UpstreamError::Json(_) | UpstreamError::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "Request failed");
        }

        (status, axum::Json(json!({"error": self.to_string()}))).into_response()
    }
}
