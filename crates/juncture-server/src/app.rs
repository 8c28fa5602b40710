//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::security;
use crate::state::AppState;
use crate::static_files::{self, STATIC_PATHS};

/// Create the application router.
///
/// Named routes answer GET; any other method on them, and any unmatched
/// path, is rendered as a page.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new().route(
        "/search",
        get(handlers::search::search).fallback(handlers::pages::render_page),
    );

    for path in STATIC_PATHS {
        router = router.route(
            path,
            get(static_files::serve_static).fallback(handlers::pages::render_page),
        );
    }

    router
        .fallback(handlers::pages::render_page)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(security::content_type_options_layer()),
        )
        .with_state(state)
}
