//! Content sources for the Juncture gateway.
//!
//! A site is published either from a hosted repository (`owner/repo`) or from
//! a local mirror of one. This crate provides:
//!
//! - [`ContentSource`]: which of the two the process serves, fixed at startup
//! - [`LocalContent`]: markdown lookup in a local mirror
//! - [`StaticAssetProxy`]: root-level files (favicon, robots, sitemap) from
//!   either source
//!
//! # Path Convention
//!
//! Logical paths are URL paths with a leading slash (`"/"`, `"/about"`,
//! `"/essays/"`). They are appended to the content root literally; no
//! normalization or traversal check is applied.

mod assets;
mod local;

pub use assets::{RAW_CONTENT_HOST, StaticAsset, StaticAssetProxy, mime_for};
pub use local::LocalContent;

use std::borrow::Cow;
use std::path::PathBuf;

/// Where site content comes from.
///
/// Chosen once at startup and never changed while serving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// Hosted repository identifier (e.g. `"juncture-digital/hosting"`).
    RemoteRepository(String),
    /// Absolute path of a local mirror.
    LocalDirectory(PathBuf),
}

impl ContentSource {
    /// Identifier sent to collaborators as the `prefix` parameter.
    ///
    /// For a local mirror this is the directory path itself.
    #[must_use]
    pub fn identifier(&self) -> Cow<'_, str> {
        match self {
            Self::RemoteRepository(id) => Cow::Borrowed(id),
            Self::LocalDirectory(path) => path.to_string_lossy(),
        }
    }

    /// Whether content is read from the local filesystem.
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self, Self::LocalDirectory(_))
    }
}

/// Error reading local content.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// Reading a file failed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Fetching from the raw content host failed.
    #[error(transparent)]
    Upstream(#[from] juncture_upstream::UpstreamError),
}
