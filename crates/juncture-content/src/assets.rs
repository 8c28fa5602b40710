//! Root-level static files served from the content source.

use std::sync::Arc;

use juncture_upstream::Upstream;
use tracing::debug;

use crate::{ContentError, ContentSource, LocalContent};

/// Host serving raw files of hosted repositories.
pub const RAW_CONTENT_HOST: &str = "https://raw.githubusercontent.com";

/// Branch raw files are fetched from.
const BRANCH: &str = "main";

/// A static file ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticAsset {
    /// File bytes (empty when the upstream failed).
    pub body: Vec<u8>,
    /// HTTP status code.
    pub status: u16,
    /// MIME type derived from the extension.
    pub mime: &'static str,
}

/// Return the MIME type for a request path.
///
/// Only the handful of types the gateway serves are recognized; everything
/// else is `text/plain`.
pub fn mime_for(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("ico") => "image/vnd.microsoft.icon",
        Some("css") => "text/css",
        Some("html") => "text/html",
        _ => "text/plain",
    }
}

/// Serves files like `/favicon.ico` from the local mirror or the raw content
/// host.
pub struct StaticAssetProxy {
    source: ContentSource,
    upstream: Arc<dyn Upstream>,
}

impl StaticAssetProxy {
    /// Create a proxy for the given source.
    #[must_use]
    pub fn new(source: ContentSource, upstream: Arc<dyn Upstream>) -> Self {
        Self {
            source,
            upstream,
        }
    }

    /// Fetch the file at `request_path` (leading slash included).
    ///
    /// A local mirror reads the file directly. A hosted repository is fetched
    /// from `<raw host>/<repo>/main<path>`; a non-200 answer yields an empty
    /// body carrying the upstream status.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Io`] if a local file is missing or unreadable,
    /// and [`ContentError::Upstream`] if the raw host cannot be reached.
    pub fn serve(&self, request_path: &str) -> Result<StaticAsset, ContentError> {
        let mime = mime_for(request_path);

        match &self.source {
            ContentSource::LocalDirectory(root) => {
                let body = LocalContent::new(root.as_path()).read_file(request_path)?;
                Ok(StaticAsset {
                    body,
                    status: 200,
                    mime,
                })
            }
            ContentSource::RemoteRepository(repo) => {
                let url = format!("{RAW_CONTENT_HOST}/{repo}/{BRANCH}{request_path}");
                let response = self.upstream.get(&url)?;
                debug!(url = %url, status = response.status, "Fetched static file");

                let status = response.status;
                let body = if response.is_ok() {
                    response.body
                } else {
                    Vec::new()
                };
                Ok(StaticAsset { body, status, mime })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use juncture_upstream::MockUpstream;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_mime_for() {
        assert_eq!(mime_for("/favicon.ico"), "image/vnd.microsoft.icon");
        assert_eq!(mime_for("/style.css"), "text/css");
        assert_eq!(mime_for("/index.html"), "text/html");
        assert_eq!(mime_for("/robots.txt"), "text/plain");
        assert_eq!(mime_for("/sitemap.txt"), "text/plain");
        assert_eq!(mime_for("/noextension"), "text/plain");
    }

    #[test]
    fn test_remote_favicon_bytes() {
        let upstream = Arc::new(MockUpstream::new().with_response(
            "https://raw.githubusercontent.com/acme/site/main/favicon.ico",
            200,
            vec![0x00, 0x01],
        ));
        let proxy = StaticAssetProxy::new(
            ContentSource::RemoteRepository("acme/site".to_owned()),
            Arc::clone(&upstream) as Arc<dyn Upstream>,
        );

        let asset = proxy.serve("/favicon.ico").unwrap();

        assert_eq!(
            asset,
            StaticAsset {
                body: vec![0x00, 0x01],
                status: 200,
                mime: "image/vnd.microsoft.icon",
            }
        );
        assert_eq!(upstream.call_count(), 1);
    }

    #[test]
    fn test_remote_failure_empties_body() {
        let upstream = Arc::new(MockUpstream::new().with_response(
            "https://raw.githubusercontent.com/",
            500,
            "upstream exploded",
        ));
        let proxy = StaticAssetProxy::new(
            ContentSource::RemoteRepository("acme/site".to_owned()),
            upstream,
        );

        let asset = proxy.serve("/robots.txt").unwrap();

        assert_eq!(asset.status, 500);
        assert!(asset.body.is_empty());
        assert_eq!(asset.mime, "text/plain");
    }

    #[test]
    fn test_remote_url_uses_main_branch() {
        let upstream = Arc::new(MockUpstream::new());
        let proxy = StaticAssetProxy::new(
            ContentSource::RemoteRepository("acme/site".to_owned()),
            Arc::clone(&upstream) as Arc<dyn Upstream>,
        );

        proxy.serve("/sitemap.txt").unwrap();

        assert_eq!(
            upstream.calls()[0].url,
            "https://raw.githubusercontent.com/acme/site/main/sitemap.txt"
        );
    }

    #[test]
    fn test_local_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("robots.txt"), "User-agent: *").unwrap();
        let upstream = Arc::new(MockUpstream::new());
        let proxy = StaticAssetProxy::new(
            ContentSource::LocalDirectory(dir.path().to_path_buf()),
            Arc::clone(&upstream) as Arc<dyn Upstream>,
        );

        let asset = proxy.serve("/robots.txt").unwrap();

        assert_eq!(asset.body, b"User-agent: *");
        assert_eq!(asset.status, 200);
        assert_eq!(upstream.call_count(), 0);
    }

    #[test]
    fn test_local_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let proxy = StaticAssetProxy::new(
            ContentSource::LocalDirectory(dir.path().to_path_buf()),
            Arc::new(MockUpstream::new()),
        );

        let err = proxy.serve("/favicon.ico").unwrap_err();
        assert!(matches!(err, ContentError::Io { ref source, .. } if source.kind() == std::io::ErrorKind::NotFound));
    }
}
