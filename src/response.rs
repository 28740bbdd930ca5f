//! Buffered HTTP responses.
//!
//! The [`Response`] type owns its status, headers and the complete body, so
//! it can be stored in the cache, cloned, and decoded as many times as the
//! caller needs.

use crate::{Error, Result};
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// A response received from (or replayed for) a call.
///
/// Any status is a valid response: a `404` comes back as `Ok(Response)`.
/// Use [`extract_paginated`](crate::extract_paginated) and friends to turn
/// non-success statuses into errors.
///
/// # Examples
///
/// ```no_run
/// use blackbeard::Client;
///
/// # async fn example() -> Result<(), blackbeard::Error> {
/// let client = Client::builder().base_path("https://api.example.com").build()?;
/// let response = client.get("/posts/1", None).await?;
///
/// println!("Status: {}", response.status());
/// println!("Took {:?}", response.latency());
/// println!("Served from cache: {}", response.from_cache());
/// println!("Body: {}", response.text());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    latency: Duration,
    from_cache: bool,
}

impl Response {
    /// Creates a new `Response`.
    ///
    /// This is typically called internally by the client once the body has
    /// been buffered.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes, latency: Duration) -> Self {
        Self {
            status,
            headers,
            body,
            latency,
            from_cache: false,
        }
    }

    pub(crate) fn into_cached(mut self) -> Self {
        self.from_cache = true;
        self.latency = Duration::ZERO;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value by name.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blackbeard::Response;
    /// # use http::{HeaderMap, HeaderValue, StatusCode};
    /// # use std::time::Duration;
    /// let mut headers = HeaderMap::new();
    /// headers.insert("content-type", HeaderValue::from_static("application/json"));
    ///
    /// let response = Response::new(StatusCode::OK, headers, "{}".into(), Duration::ZERO);
    ///
    /// assert_eq!(response.header("Content-Type"), Some("application/json"));
    /// ```
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// The raw body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The body as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Time between sending the request and receiving the full body.
    ///
    /// Zero for responses served from the cache.
    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Returns `true` if this response was replayed from the cache.
    pub fn from_cache(&self) -> bool {
        self.from_cache
    }

    /// Returns `true` for statuses in the 200-399 range.
    pub fn is_success_range(&self) -> bool {
        (200..400).contains(&self.status.as_u16())
    }

    /// Decodes the body into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTarget`] if the body is valid JSON of another
    /// shape, [`Error::DecodeFailed`] if it is not valid JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(Error::from_serde)
    }
}
