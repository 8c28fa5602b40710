//! Mock upstream for testing.
//!
//! Provides [`MockUpstream`] for exercising gateway components without
//! network access.

use std::sync::Mutex;

use crate::{Upstream, UpstreamError, UpstreamResponse};

/// A call received by [`MockUpstream`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// HTTP method (`"GET"` or `"POST"`).
    pub method: &'static str,
    /// Full request URL including query string.
    pub url: String,
    /// JSON body for POST requests.
    pub body: Option<serde_json::Value>,
}

/// Mock upstream with scripted responses.
///
/// Routes are matched by URL prefix in registration order. A URL that matches
/// no route gets an empty 404. Every call is recorded, matched or not.
///
/// # Example
///
/// ```ignore
/// use juncture_upstream::{MockUpstream, Upstream};
///
/// let upstream = MockUpstream::new().with_response("https://api.test/html/", 200, "<h1>Hi</h1>");
/// let response = upstream.get("https://api.test/html/?base=/").unwrap();
/// assert_eq!(response.status, 200);
/// assert_eq!(upstream.call_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockUpstream {
    routes: Vec<(String, UpstreamResponse)>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockUpstream {
    /// Create a mock with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer URLs starting with `prefix` with the given status and body.
    #[must_use]
    pub fn with_response(
        mut self,
        prefix: impl Into<String>,
        status: u16,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        self.routes
            .push((prefix.into(), UpstreamResponse::new(status, body)));
        self
    }

    /// All calls received so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls received so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn respond(&self, call: RecordedCall) -> UpstreamResponse {
        let response = self
            .routes
            .iter()
            .find(|(prefix, _)| call.url.starts_with(prefix.as_str()))
            .map_or_else(
                || UpstreamResponse::new(404, Vec::new()),
                |(_, response)| response.clone(),
            );
        self.calls.lock().unwrap().push(call);
        response
    }
}

impl Upstream for MockUpstream {
    fn get(&self, url: &str) -> Result<UpstreamResponse, UpstreamError> {
        Ok(self.respond(RecordedCall {
            method: "GET",
            url: url.to_owned(),
            body: None,
        }))
    }

    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<UpstreamResponse, UpstreamError> {
        Ok(self.respond(RecordedCall {
            method: "POST",
            url: url.to_owned(),
            body: Some(body.clone()),
        }))
    }
}
