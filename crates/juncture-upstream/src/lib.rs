//! Outbound HTTP for the Juncture gateway.
//!
//! Every call the gateway makes to another service (rendering API, raw
//! content host, search API) goes through the [`Upstream`] trait. This keeps
//! the components that decide *what* to request free of transport details:
//!
//! - [`HttpUpstream`]: blocking client backed by a shared `ureq` agent
//! - [`MockUpstream`]: scripted responses with call recording (behind the
//!   `mock` feature flag)
//!
//! Upstream status codes are never turned into errors. A 404 or 500 from a
//! collaborator is a successful round-trip whose status the caller relays;
//! [`UpstreamError`] is reserved for transport failures.
//!
//! # Example
//!
//! ```ignore
//! use juncture_upstream::{HttpUpstream, Upstream, url_with_query};
//!
//! let upstream = HttpUpstream::new(None);
//! let url = url_with_query("https://api.example.org/html/about", &[("base", "/about/")])?;
//! let response = upstream.get(&url)?;
//! println!("{} ({} bytes)", response.status, response.body.len());
//! ```

mod http;
#[cfg(feature = "mock")]
mod mock;

pub use http::HttpUpstream;
#[cfg(feature = "mock")]
pub use mock::{MockUpstream, RecordedCall};

/// HTTP status code for a successful upstream response.
pub const STATUS_OK: u16 = 200;

/// Response returned by an upstream service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl UpstreamResponse {
    /// Create a response from status and body.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the upstream answered with 200.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body decoded as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, UpstreamError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Blocking outbound HTTP.
///
/// Implementations perform exactly one round-trip per call: no retries, no
/// redirects to other services, no caching.
pub trait Upstream: Send + Sync {
    /// Issue a GET request.
    fn get(&self, url: &str) -> Result<UpstreamResponse, UpstreamError>;

    /// Issue a POST request with a JSON body.
    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<UpstreamResponse, UpstreamError>;
}

/// Error from an upstream round-trip.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Request failed before a status was received (DNS, connect, timeout).
    #[error("HTTP request failed: {0}")]
    Http(#[from] ureq::Error),

    /// Body could not be decoded as JSON.
    #[error("invalid JSON from upstream: {0}")]
    Json(#[from] serde_json::Error),

    /// Query string could not be encoded.
    #[error("query encoding failed: {0}")]
    Query(#[from] serde_urlencoded::ser::Error),
}

/// Append form-encoded query parameters to a URL.
///
/// Parameter order is preserved, so equal inputs always produce the same
/// string. Returns `base` unchanged when `params` is empty.
pub fn url_with_query<K, V>(base: &str, params: &[(K, V)]) -> Result<String, UpstreamError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if params.is_empty() {
        return Ok(base.to_owned());
    }
    let pairs: Vec<(&str, &str)> = params
        .iter()
        .map(|(k, v)| (k.as_ref(), v.as_ref()))
        .collect();
    let query = serde_urlencoded::to_string(pairs)?;
    Ok(format!("{base}?{query}"))
}
