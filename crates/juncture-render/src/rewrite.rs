//! Bundle URL rewriting for rendered pages.
//!
//! Rendered pages reference the unpinned client bundle on the CDN. The
//! rewriter pins it to a version and/or swaps the script for a custom build.
//! Both are plain substring operations over the whole document: matches
//! inside attributes, comments, or text are rewritten alike.

use std::borrow::Cow;

use juncture_config::{AssetsConfig, DEFAULT_SCRIPT_ENDPOINT, LATEST_VERSION};

/// Unpinned bundle base referenced by rendered pages.
pub const DEFAULT_BUNDLE_BASE: &str = "https://cdn.jsdelivr.net/npm/juncture-digital/docs";

/// Stylesheet shipped alongside the default script bundle.
pub const DEFAULT_STYLESHEET_URL: &str =
    "https://cdn.jsdelivr.net/npm/juncture-digital/docs/css/index.css";

/// Post-processor for rendered HTML.
#[derive(Debug, Clone, Default)]
pub struct ResponseRewriter {
    /// Versioned bundle base replacing [`DEFAULT_BUNDLE_BASE`].
    pinned_base: Option<String>,
    /// Script URL replacing [`DEFAULT_SCRIPT_ENDPOINT`].
    script_override: Option<String>,
}

impl ResponseRewriter {
    /// Create a rewriter from a version tag and script endpoint.
    ///
    /// `"latest"` disables pinning; the default script endpoint disables the
    /// override.
    #[must_use]
    pub fn new(version: &str, script_endpoint: &str) -> Self {
        let pinned_base = (version != LATEST_VERSION)
            .then(|| format!("https://cdn.jsdelivr.net/npm/juncture-digital@{version}/docs"));
        let script_override =
            (script_endpoint != DEFAULT_SCRIPT_ENDPOINT).then(|| script_endpoint.to_owned());

        Self {
            pinned_base,
            script_override,
        }
    }

    /// Create a rewriter from the `[assets]` configuration.
    #[must_use]
    pub fn from_config(config: &AssetsConfig) -> Self {
        Self::new(&config.version, &config.script_endpoint)
    }

    /// Whether rewriting leaves every document unchanged.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.pinned_base.is_none() && self.script_override.is_none()
    }

    /// Rewrite bundle references in `html`.
    ///
    /// Version pinning runs first, then the script override. With an override,
    /// every line mentioning [`DEFAULT_STYLESHEET_URL`] is dropped along with
    /// its line terminator.
    #[must_use]
    pub fn rewrite<'a>(&self, html: &'a str) -> Cow<'a, str> {
        let mut html = Cow::Borrowed(html);

        if let Some(pinned) = &self.pinned_base
            && html.contains(DEFAULT_BUNDLE_BASE)
        {
            html = Cow::Owned(html.replace(DEFAULT_BUNDLE_BASE, pinned));
        }

        if let Some(script) = &self.script_override {
            if html.contains(DEFAULT_SCRIPT_ENDPOINT) {
                html = Cow::Owned(html.replace(DEFAULT_SCRIPT_ENDPOINT, script));
            }
            if html.contains(DEFAULT_STYLESHEET_URL) {
                html = Cow::Owned(strip_lines_containing(&html, DEFAULT_STYLESHEET_URL));
            }
        }

        html
    }
}

/// Remove every line (terminator included) that contains `needle`.
fn strip_lines_containing(text: &str, needle: &str) -> String {
    text.split_inclusive('\n')
        .filter(|line| !line.contains(needle))
        .collect()
}
