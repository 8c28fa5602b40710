//! Page rendering for the Juncture gateway.
//!
//! Markdown is never converted here. The gateway hands it to an external
//! rendering service and post-processes the HTML that comes back:
//!
//! - [`RequestContext`]: what an inbound page request asks for
//! - [`RenderClient`]: one round-trip to the rendering service per request
//! - [`ResponseRewriter`]: retargets script/style bundle URLs in the result
//!
//! # Flow
//!
//! ```text
//! RequestContext ──► RenderClient ──► RenderResult ──► ResponseRewriter ──► HTML
//!                        │
//!                        ├─ local mirror: POST markdown to <endpoint>/html/
//!                        └─ hosted repo:  GET <endpoint>/html<path>
//! ```

mod client;
mod context;
mod rewrite;

pub use client::{RenderClient, RenderResult};
pub use context::{RequestContext, base_url_for};
pub use rewrite::{DEFAULT_BUNDLE_BASE, DEFAULT_STYLESHEET_URL, ResponseRewriter};

/// Error from a render round-trip.
///
/// Upstream statuses are not errors; they come back in [`RenderResult`].
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Local markdown could not be read.
    #[error(transparent)]
    Content(#[from] juncture_content::ContentError),

    /// Rendering service could not be reached.
    #[error(transparent)]
    Upstream(#[from] juncture_upstream::UpstreamError),
}
