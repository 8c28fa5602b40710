//! Markdown lookup in a local mirror.

use std::ffi::OsString;
use std::path::PathBuf;

use tracing::debug;

use crate::ContentError;

/// Local mirror of a site repository.
#[derive(Debug, Clone)]
pub struct LocalContent {
    root: PathBuf,
}

impl LocalContent {
    /// Create a locator rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Find the markdown for a logical path.
    ///
    /// Tries `<root><path>.md`, then `<root><path>/README.md`, after dropping
    /// a trailing slash from `path`. Returns `Ok(None)` when neither exists.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Io`] if a candidate exists but cannot be read.
    pub fn locate(&self, path: &str) -> Result<Option<String>, ContentError> {
        let path = path.strip_suffix('/').unwrap_or(path);

        for candidate in [self.join(path, ".md"), self.join(path, "/README.md")] {
            if candidate.is_file() {
                debug!(path = %path, file = %candidate.display(), "Found local markdown");
                return std::fs::read_to_string(&candidate)
                    .map(Some)
                    .map_err(|source| ContentError::Io {
                        path: candidate,
                        source,
                    });
            }
        }

        debug!(path = %path, root = %self.root.display(), "No local markdown");
        Ok(None)
    }

    /// Read a file below the root, e.g. `/robots.txt`.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Io`] if the file is missing or unreadable.
    pub fn read_file(&self, request_path: &str) -> Result<Vec<u8>, ContentError> {
        let file = self.join(request_path, "");
        std::fs::read(&file).map_err(|source| ContentError::Io { path: file, source })
    }

    /// `<root><path><suffix>` by plain concatenation.
    fn join(&self, path: &str, suffix: &str) -> PathBuf {
        let mut joined = OsString::from(self.root.as_os_str());
        joined.push(path);
        joined.push(suffix);
        PathBuf::from(joined)
    }
}
