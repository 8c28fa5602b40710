//! Inbound page request context.

/// Derive the base URL for a request path.
///
/// The rendering service resolves relative links against this value, so it
/// always ends with `/`: `"/about"` becomes `"/about/"`, `"/"` stays `"/"`.
pub fn base_url_for(request_path: &str) -> String {
    if request_path.is_empty() {
        return "/".to_owned();
    }
    if request_path.ends_with('/') {
        request_path.to_owned()
    } else {
        format!("{request_path}/")
    }
}

/// A page request as seen by the render client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Logical path with leading slash (`"/"`, `"/about"`).
    pub path: String,
    /// Base URL for relative link resolution.
    pub base_url: String,
    /// Version-control reference to render (branch, tag, commit).
    pub git_ref: Option<String>,
    /// Every inbound query parameter, in request order.
    pub params: Vec<(String, String)>,
}

impl RequestContext {
    /// Build a context from the request path and its query parameters.
    ///
    /// The `ref` parameter is lifted into [`RequestContext::git_ref`] (first
    /// occurrence, empty values ignored); all parameters are kept in
    /// [`RequestContext::params`].
    #[must_use]
    pub fn new(request_path: &str, params: Vec<(String, String)>) -> Self {
        let path = if request_path.is_empty() {
            "/".to_owned()
        } else {
            request_path.to_owned()
        };
        let git_ref = params
            .iter()
            .find(|(k, _)| k == "ref")
            .map(|(_, v)| v.clone())
            .filter(|v| !v.is_empty());

        Self {
            base_url: base_url_for(&path),
            path,
            git_ref,
            params,
        }
    }
}
