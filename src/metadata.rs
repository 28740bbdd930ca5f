//! Request metadata for the generic [`Client::call`](crate::Client::call) entry point.

use crate::{body::Payload, query::Query, Result};
use http::Method;
use serde::Serialize;

/// Everything that describes one call apart from the client configuration.
///
/// The verb helpers on [`Client`](crate::Client) build one of these; use it
/// directly for combinations they do not cover, such as a POST with query
/// parameters or a DELETE with raw bytes.
///
/// # Examples
///
/// ```
/// use blackbeard::metadata::RequestMetadata;
/// use http::Method;
///
/// let metadata = RequestMetadata::new(Method::POST, "/search")
///     .with_query_param("page", "2")
///     .with_json(&serde_json::json!({"q": "rust"}))
///     .unwrap();
///
/// assert_eq!(metadata.query.get("page"), Some(&["2".to_string()][..]));
/// ```
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// The HTTP method (GET, POST, etc.).
    pub method: Method,

    /// The request path, appended to the client's composed prefix.
    pub path: String,

    /// Query parameters for this request.
    pub query: Query,

    /// The request body.
    pub payload: Payload,
}

impl RequestMetadata {
    /// Creates a new `RequestMetadata` with the given method and path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Query::new(),
            payload: Payload::Empty,
        }
    }

    /// Adds a query parameter, keeping values already present under `name`.
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.add(name, value);
        self
    }

    /// Adds every parameter of `query`.
    pub fn with_query(mut self, query: &Query) -> Self {
        for (name, value) in query.pairs() {
            self.query.add(name, value);
        }
        self
    }

    /// Sets the body to the JSON form of `body`.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be serialized.
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.payload = Payload::json(body)?;
        Ok(self)
    }

    /// Sets the body.
    pub fn with_payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = payload.into();
        self
    }

    pub(crate) fn query(&self) -> Option<&Query> {
        if self.query.is_empty() {
            None
        } else {
            Some(&self.query)
        }
    }
}

impl Default for RequestMetadata {
    fn default() -> Self {
        Self::new(Method::GET, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_accumulates() {
        let metadata = RequestMetadata::new(Method::GET, "/posts")
            .with_query_param("tag", "a")
            .with_query(&Query::from([("tag", "b"), ("limit", "5")]));

        assert_eq!(metadata.query.get("tag").map(<[String]>::len), Some(2));
        assert!(metadata.query().is_some());
    }

    #[test]
    fn test_empty_query_is_none() {
        assert!(RequestMetadata::default().query().is_none());
    }

    #[test]
    fn test_with_json_sets_payload() {
        let metadata = RequestMetadata::new(Method::PUT, "/posts/1")
            .with_json(&serde_json::json!({"title": "t"}))
            .unwrap();
        assert!(matches!(metadata.payload, Payload::Json(_)));
    }
}
