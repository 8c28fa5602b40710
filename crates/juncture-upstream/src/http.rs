//! `ureq`-backed [`Upstream`] implementation.

use std::time::Duration;

use tracing::debug;
use ureq::Agent;

use crate::{Upstream, UpstreamError, UpstreamResponse};

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT: u64 = 30;

/// Blocking HTTP client shared by all gateway components.
///
/// Non-2xx responses are returned as [`UpstreamResponse`] values rather than
/// errors so that callers can relay the status unchanged.
#[derive(Clone)]
pub struct HttpUpstream {
    agent: Agent,
}

impl HttpUpstream {
    /// Create a client with the given global timeout.
    ///
    /// `None` uses [`DEFAULT_TIMEOUT`].
    #[must_use]
    pub fn new(timeout: Option<Duration>) -> Self {
        let timeout = timeout.unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT));
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self { agent }
    }
}

impl Default for HttpUpstream {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Upstream for HttpUpstream {
    fn get(&self, url: &str) -> Result<UpstreamResponse, UpstreamError> {
        let response = self.agent.get(url).call()?;
        let status = response.status().as_u16();
        let body = response.into_body().read_to_vec()?;

        debug!(url = %url, status, bytes = body.len(), "GET upstream");
        Ok(UpstreamResponse { status, body })
    }

    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let response = self
            .agent
            .post(url)
            .header("Accept", "text/html")
            .send_json(body)?;
        let status = response.status().as_u16();
        let body = response.into_body().read_to_vec()?;

        debug!(url = %url, status, bytes = body.len(), "POST upstream");
        Ok(UpstreamResponse { status, body })
    }
}
