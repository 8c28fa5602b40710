//! Rendering service client.

use std::sync::Arc;

use juncture_content::{ContentSource, LocalContent};
use juncture_upstream::{Upstream, UpstreamResponse, url_with_query};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde_json::json;
use tracing::{debug, info};

use crate::RenderError;
use crate::context::RequestContext;

/// Characters escaped when a logical path is placed in a service URL.
const PATH_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Rendered page and the status to send with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResult {
    /// Rendered HTML (empty on failure).
    pub html: String,
    /// HTTP status code.
    pub status: u16,
}

impl RenderResult {
    /// Result for a page whose local markdown does not exist.
    #[must_use]
    pub fn not_found() -> Self {
        Self {
            html: String::new(),
            status: 404,
        }
    }

    /// Keep the body only when the service answered 200.
    fn from_upstream(response: &UpstreamResponse) -> Self {
        Self {
            html: if response.is_ok() {
                response.text()
            } else {
                String::new()
            },
            status: response.status,
        }
    }
}

/// Client for the external markdown rendering service.
///
/// Issues exactly one upstream request per [`RenderClient::render`] call.
/// Failures are not retried; the service's status is returned as-is.
pub struct RenderClient {
    endpoint: String,
    source: ContentSource,
    upstream: Arc<dyn Upstream>,
}

impl RenderClient {
    /// Create a client for `endpoint` serving content from `source`.
    #[must_use]
    pub fn new(endpoint: &str, source: ContentSource, upstream: Arc<dyn Upstream>) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            source,
            upstream,
        }
    }

    /// Render the page described by `ctx`.
    ///
    /// With a local mirror, the markdown is located first; a missing or empty
    /// page yields [`RenderResult::not_found`] without contacting the service.
    /// With a hosted repository, the service fetches the markdown itself.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if local markdown cannot be read or the
    /// service cannot be reached.
    pub fn render(&self, ctx: &RequestContext) -> Result<RenderResult, RenderError> {
        match &self.source {
            ContentSource::LocalDirectory(root) => {
                let markdown = LocalContent::new(root.as_path())
                    .locate(&ctx.path)?
                    .filter(|markdown| !markdown.is_empty());
                let Some(markdown) = markdown else {
                    debug!(path = %ctx.path, "Local page not found");
                    return Ok(RenderResult::not_found());
                };
                self.render_markdown(&markdown, &ctx.base_url)
            }
            ContentSource::RemoteRepository(_) => {
                self.render_remote(&ctx.path, &ctx.base_url, ctx.git_ref.as_deref())
            }
        }
    }

    /// Upload markdown for conversion.
    fn render_markdown(
        &self,
        markdown: &str,
        base_url: &str,
    ) -> Result<RenderResult, RenderError> {
        let prefix = self.source.identifier();
        let url = url_with_query(
            &format!("{}/html/", self.endpoint),
            &[("prefix", &*prefix), ("base", base_url)],
        )?;
        let body = json!({
            "markdown": markdown,
            "prefix": prefix,
        });

        let response = self.upstream.post_json(&url, &body)?;
        info!(url = %url, status = response.status, "Rendered local markdown");
        Ok(RenderResult::from_upstream(&response))
    }

    /// Ask the service to fetch and render a repository path.
    fn render_remote(
        &self,
        path: &str,
        base_url: &str,
        git_ref: Option<&str>,
    ) -> Result<RenderResult, RenderError> {
        let prefix = self.source.identifier();
        let mut params = vec![("prefix", &*prefix), ("base", base_url)];
        if let Some(git_ref) = git_ref {
            params.push(("ref", git_ref));
        }
        let path = utf8_percent_encode(path, PATH_ESCAPE);
        let url = url_with_query(&format!("{}/html{path}", self.endpoint), &params)?;

        let response = self.upstream.get(&url)?;
        info!(url = %url, status = response.status, "Rendered remote page");
        Ok(RenderResult::from_upstream(&response))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use juncture_upstream::MockUpstream;
    use pretty_assertions::assert_eq;

    use super::*;

    const ENDPOINT: &str = "https://api.test";

    fn remote(upstream: &Arc<MockUpstream>) -> RenderClient {
        RenderClient::new(
            ENDPOINT,
            ContentSource::RemoteRepository("acme/site".to_owned()),
            Arc::clone(upstream) as Arc<dyn Upstream>,
        )
    }

    fn ctx(path: &str, params: &[(&str, &str)]) -> RequestContext {
        RequestContext::new(
            path,
            params
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
        )
    }

    #[test]
    fn test_remote_success() {
        let upstream = Arc::new(MockUpstream::new().with_response(
            "https://api.test/html/about",
            200,
            "<h1>About</h1>",
        ));
        let client = remote(&upstream);

        let result = client.render(&ctx("/about", &[])).unwrap();

        assert_eq!(
            result,
            RenderResult {
                html: "<h1>About</h1>".to_owned(),
                status: 200,
            }
        );
        let calls = upstream.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "GET");
        assert_eq!(
            calls[0].url,
            "https://api.test/html/about?prefix=acme%2Fsite&base=%2Fabout%2F"
        );
    }

    #[test]
    fn test_remote_not_found_empties_body() {
        let upstream =
            Arc::new(MockUpstream::new().with_response("https://api.test/html/about", 404, "nope"));
        let client = remote(&upstream);

        let result = client.render(&ctx("/about", &[])).unwrap();

        assert_eq!(result.status, 404);
        assert_eq!(result.html, "");
        assert_eq!(upstream.call_count(), 1);
    }

    #[test]
    fn test_remote_single_call_for_any_status() {
        for status in [200, 301, 404, 500, 503] {
            let upstream =
                Arc::new(MockUpstream::new().with_response("https://api.test/", status, "x"));
            let client = remote(&upstream);

            let result = client.render(&ctx("/page", &[])).unwrap();

            assert_eq!(result.status, status);
            assert_eq!(upstream.call_count(), 1, "status {status} should not retry");
        }
    }

    #[test]
    fn test_remote_forwards_ref_only() {
        let upstream = Arc::new(MockUpstream::new());
        let client = remote(&upstream);

        client
            .render(&ctx("/about", &[("ref", "draft"), ("theme", "dark")]))
            .unwrap();

        let calls = upstream.calls();
        let url = &calls[0].url;
        assert!(url.ends_with("&ref=draft"), "{url}");
        assert!(!url.contains("theme"), "{url}");
    }

    #[test]
    fn test_remote_root_path() {
        let upstream = Arc::new(MockUpstream::new());
        let client = remote(&upstream);

        client.render(&ctx("/", &[])).unwrap();

        assert_eq!(
            upstream.calls()[0].url,
            "https://api.test/html/?prefix=acme%2Fsite&base=%2F"
        );
    }

    #[test]
    fn test_remote_path_is_escaped() {
        let upstream = Arc::new(MockUpstream::new());
        let client = remote(&upstream);

        client.render(&ctx("/notes/día uno", &[])).unwrap();

        let calls = upstream.calls();
        assert!(
            calls[0]
                .url
                .starts_with("https://api.test/html/notes/d%C3%ADa%20uno?prefix="),
            "{}",
            calls[0].url
        );
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let upstream = Arc::new(MockUpstream::new());
        let client = RenderClient::new(
            "https://api.test/",
            ContentSource::RemoteRepository("acme/site".to_owned()),
            Arc::clone(&upstream) as Arc<dyn Upstream>,
        );

        client.render(&ctx("/about", &[])).unwrap();

        assert!(upstream.calls()[0].url.starts_with("https://api.test/html/about?"));
    }

    #[test]
    fn test_local_posts_markdown() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("README.md"), "# Hi").unwrap();
        let upstream = Arc::new(MockUpstream::new().with_response(
            "https://api.test/html/",
            200,
            "<h1>Hi</h1>",
        ));
        let client = RenderClient::new(
            ENDPOINT,
            ContentSource::LocalDirectory(dir.path().to_path_buf()),
            Arc::clone(&upstream) as Arc<dyn Upstream>,
        );

        let result = client.render(&ctx("/", &[("ref", "ignored")])).unwrap();

        assert_eq!(result.html, "<h1>Hi</h1>");
        assert_eq!(result.status, 200);

        let calls = upstream.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "POST");
        assert!(!calls[0].url.contains("ref="));
        let root = dir.path().to_string_lossy().into_owned();
        assert_eq!(
            calls[0].body,
            Some(json!({"markdown": "# Hi", "prefix": root}))
        );
    }

    #[test]
    fn test_local_upstream_failure() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("about.md"), "# About").unwrap();
        let upstream = Arc::new(MockUpstream::new().with_response(
            "https://api.test/html/",
            502,
            "bad gateway",
        ));
        let client = RenderClient::new(
            ENDPOINT,
            ContentSource::LocalDirectory(dir.path().to_path_buf()),
            Arc::clone(&upstream) as Arc<dyn Upstream>,
        );

        let result = client.render(&ctx("/about", &[])).unwrap();

        assert_eq!(result, RenderResult { html: String::new(), status: 502 });
        assert_eq!(upstream.call_count(), 1);
    }

    #[test]
    fn test_local_missing_page_skips_service() {
        let dir = tempfile::tempdir().unwrap();
        let upstream = Arc::new(MockUpstream::new());
        let client = RenderClient::new(
            ENDPOINT,
            ContentSource::LocalDirectory(dir.path().to_path_buf()),
            Arc::clone(&upstream) as Arc<dyn Upstream>,
        );

        let result = client.render(&ctx("/missing", &[])).unwrap();

        assert_eq!(result, RenderResult::not_found());
        assert_eq!(upstream.call_count(), 0);
    }

    #[test]
    fn test_local_empty_page_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("empty.md"), "").unwrap();
        let upstream = Arc::new(MockUpstream::new().with_response(
            "https://api.test/html/",
            200,
            "<p></p>",
        ));
        let client = RenderClient::new(
            ENDPOINT,
            ContentSource::LocalDirectory(dir.path().to_path_buf()),
            Arc::clone(&upstream) as Arc<dyn Upstream>,
        );

        let result = client.render(&ctx("/empty", &[])).unwrap();

        assert_eq!(result, RenderResult::not_found());
        assert_eq!(upstream.call_count(), 0);
    }
}
