//! Header resolution.
//!
//! The client keeps one [`HeaderMap`] for every call. At send time the map
//! is copied and completed with a content type when the call carries a body.
//! Authorization can be inherited from any [`HeaderSource`], typically the
//! inbound request of a server handler that fans out to other services.

use crate::{Error, Result};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue};

/// Header carrying the caller's trace identifier.
pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// Content type used for JSON bodies.
pub const JSON_CONTENT: &str = "application/json";

/// Anything a single header value can be read from.
///
/// # Examples
///
/// ```
/// use blackbeard::headers::HeaderSource;
/// use http::HeaderMap;
///
/// let mut inbound = HeaderMap::new();
/// inbound.insert("authorization", "Bearer T".parse().unwrap());
///
/// assert_eq!(inbound.header("Authorization"), Some("Bearer T"));
/// ```
pub trait HeaderSource {
    /// Returns the value of the named header, if present and valid UTF-8.
    fn header(&self, name: &str) -> Option<&str>;

    /// Returns `true` if the source carries any header at all.
    fn has_headers(&self) -> bool;
}

impl HeaderSource for HeaderMap {
    fn header(&self, name: &str) -> Option<&str> {
        self.get(name)?.to_str().ok()
    }

    fn has_headers(&self) -> bool {
        !self.is_empty()
    }
}

impl HeaderSource for http::request::Parts {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.header(name)
    }

    fn has_headers(&self) -> bool {
        self.headers.has_headers()
    }
}

impl<B> HeaderSource for http::Request<B> {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers().header(name)
    }

    fn has_headers(&self) -> bool {
        self.headers().has_headers()
    }
}

impl<S: HeaderSource + ?Sized> HeaderSource for &S {
    fn header(&self, name: &str) -> Option<&str> {
        (**self).header(name)
    }

    fn has_headers(&self) -> bool {
        (**self).has_headers()
    }
}

impl<S: HeaderSource> HeaderSource for Option<S> {
    fn header(&self, name: &str) -> Option<&str> {
        self.as_ref()?.header(name)
    }

    fn has_headers(&self) -> bool {
        self.as_ref().is_some_and(|source| source.has_headers())
    }
}

pub(crate) fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let name = HeaderName::try_from(name)
        .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
    let value = parse_value(value)?;
    Ok((name, value))
}

pub(crate) fn parse_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::try_from(value)
        .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))
}

/// Copies the authorization header of `source` into `headers`.
///
/// A source without headers leaves `headers` untouched. Only authorization
/// is propagated.
pub(crate) fn inherit_authorization(headers: &mut HeaderMap, source: &impl HeaderSource) -> Result<()> {
    if !source.has_headers() {
        return Ok(());
    }

    if let Some(token) = source.header(AUTHORIZATION.as_str()) {
        headers.insert(AUTHORIZATION, parse_value(token)?);
    }
    Ok(())
}

/// Produces the header set for one outgoing request.
///
/// `content_type` wins over the configured content type for this request
/// only; otherwise a request with a body defaults to JSON.
pub(crate) fn resolve(configured: &HeaderMap, has_body: bool, content_type: Option<&str>) -> Result<HeaderMap> {
    let mut headers = configured.clone();

    match content_type {
        Some(content_type) => {
            headers.insert(CONTENT_TYPE, parse_value(content_type)?);
        }
        None if has_body && !headers.contains_key(CONTENT_TYPE) => {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT));
        }
        None => {}
    }

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inbound(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(token).unwrap());
        headers.insert("x-unrelated", HeaderValue::from_static("secret"));
        headers
    }

    #[test]
    fn test_inherit_copies_only_authorization() {
        let mut headers = HeaderMap::new();
        inherit_authorization(&mut headers, &inbound("Bearer T")).unwrap();

        assert_eq!(headers.header("authorization"), Some("Bearer T"));
        assert!(headers.get("x-unrelated").is_none());
    }

    #[test]
    fn test_inherit_from_headerless_source_is_noop() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer mine"));

        inherit_authorization(&mut headers, &HeaderMap::new()).unwrap();
        inherit_authorization(&mut headers, &None::<HeaderMap>).unwrap();

        assert_eq!(headers.header("authorization"), Some("Bearer mine"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_inherit_from_request() {
        let request = http::Request::builder()
            .header("Authorization", "Bearer R")
            .body(())
            .unwrap();
        let mut headers = HeaderMap::new();

        inherit_authorization(&mut headers, &request).unwrap();

        assert_eq!(headers.header("authorization"), Some("Bearer R"));
    }

    #[test]
    fn test_body_defaults_to_json() {
        let resolved = resolve(&HeaderMap::new(), true, None).unwrap();
        assert_eq!(resolved.header("content-type"), Some(JSON_CONTENT));

        let resolved = resolve(&HeaderMap::new(), false, None).unwrap();
        assert!(resolved.get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_configured_content_type_is_kept() {
        let mut configured = HeaderMap::new();
        configured.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        let resolved = resolve(&configured, true, None).unwrap();
        assert_eq!(resolved.header("content-type"), Some("text/plain"));
    }

    #[test]
    fn test_override_does_not_touch_configuration() {
        let mut configured = HeaderMap::new();
        configured.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT));

        let resolved = resolve(&configured, true, Some("multipart/form-data; boundary=abc")).unwrap();

        assert_eq!(resolved.header("content-type"), Some("multipart/form-data; boundary=abc"));
        assert_eq!(configured.header("content-type"), Some(JSON_CONTENT));
    }

    #[test]
    fn test_invalid_header_name() {
        assert!(matches!(
            parse_header("bad header", "v"),
            Err(Error::ConfigurationError(_))
        ));
    }
}
