//! HTTP request handlers.

pub(crate) mod pages;
pub(crate) mod search;

use axum::http::Uri;
use percent_encoding::percent_decode_str;

use crate::error::ServerError;

/// Decode the request path into a logical path.
///
/// # Errors
///
/// Returns [`ServerError::InvalidPath`] if the path does not decode to UTF-8.
pub(crate) fn logical_path(uri: &Uri) -> Result<String, ServerError> {
    let raw = uri.path();
    percent_decode_str(raw)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .map_err(|_| ServerError::InvalidPath(raw.to_owned()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_logical_path_decodes() {
        let uri: Uri = "/notes/d%C3%ADa%20uno?x=1".parse().unwrap();
        assert_eq!(logical_path(&uri).unwrap(), "/notes/día uno");
    }

    #[test]
    fn test_logical_path_invalid_utf8_rejected() {
        let uri: Uri = "/bad%FF".parse().unwrap();
        let err = logical_path(&uri).unwrap_err();
        assert!(matches!(err, ServerError::InvalidPath(ref path) if path == "/bad%FF"));
    }

    #[test]
    fn test_logical_path_root() {
        let uri: Uri = "/".parse().unwrap();
        assert_eq!(logical_path(&uri).unwrap(), "/");
    }
}
