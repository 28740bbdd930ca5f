//! Error types for REST calls.
//!
//! Every failure a call or a decoding helper can produce is a variant of
//! [`Error`]. Application-level failures (a non-2xx status that was
//! successfully received) are *not* errors of the call itself: they only
//! become [`Error::Api`] when the caller asks one of the extraction helpers
//! to validate the response.

use crate::decode::ErrorResponse;
use http::StatusCode;
use std::path::PathBuf;

/// The main error type for the client.
///
/// # Examples
///
/// ```no_run
/// use blackbeard::{extract_paginated, Client, Error};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Post { id: u64 }
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder().base_path("https://api.example.com").build()?;
/// let response = client.get("/posts", None).await?;
///
/// match extract_paginated::<Post>(&response) {
///     Ok(posts) => println!("{} posts", posts.len()),
///     Err(Error::Api(remote)) => eprintln!("service said {}: {}", remote.code, remote.message),
///     Err(e) => eprintln!("other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A network-level error occurred (connection failed, DNS lookup failed, TLS, etc.).
    ///
    /// Transport failures are reported as-is. They are never retried and
    /// never cached.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The request took longer than the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// Failed to serialize the request body.
    ///
    /// Raised before any network I/O happens.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// A file named in a multipart body could not be read.
    #[error("Failed to read multipart file {}: {source}", .path.display())]
    MultipartFile {
        /// The path that failed to open or read
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The composed endpoint is not a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Invalid configuration was provided.
    ///
    /// Invalid header names or values, a missing base path environment
    /// variable, or a transport that could not be built.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The data is well-formed JSON but does not fit the receiver's shape.
    #[error("Invalid decode target: {0}")]
    InvalidTarget(String),

    /// The data could not be decoded at all (malformed or truncated JSON).
    #[error("Failed to decode data: {0}")]
    DecodeFailed(String),

    /// A first-record extraction found no records in the page.
    #[error("Paginated response contains no records")]
    EmptyPage,

    /// The remote service answered outside the 200-399 range.
    ///
    /// Carries the service's structured error body, or a fallback wrapper
    /// when the body was not in the expected shape.
    #[error(transparent)]
    Api(ErrorResponse),
}

impl Error {
    /// Returns the HTTP status code for [`Error::Api`] errors.
    ///
    /// The code comes from the error body, so it is `None` when the body
    /// carries no usable code.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api(remote) => u16::try_from(remote.code)
                .ok()
                .and_then(|code| StatusCode::from_u16(code).ok()),
            _ => None,
        }
    }

    /// Returns the structured remote error, if this is one.
    pub fn as_error_response(&self) -> Option<&ErrorResponse> {
        match self {
            Error::Api(remote) => Some(remote),
            _ => None,
        }
    }

    /// Returns `true` if this error carries a structured remote error.
    pub fn is_error_response(&self) -> bool {
        matches!(self, Error::Api(_))
    }

    /// Returns `true` if decoding failed because of the receiver's shape.
    pub fn is_invalid_target(&self) -> bool {
        matches!(self, Error::InvalidTarget(_))
    }

    /// Returns `true` for failures of the underlying transport.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Timeout)
    }

    /// Splits JSON failures into shape mismatches and malformed input.
    pub(crate) fn from_serde(error: serde_json::Error) -> Self {
        match error.classify() {
            serde_json::error::Category::Data => Error::InvalidTarget(error.to_string()),
            _ => Error::DecodeFailed(error.to_string()),
        }
    }

    pub(crate) fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Error::Timeout
        } else {
            Error::Network(error)
        }
    }
}

/// A specialized `Result` type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_status() {
        let err = Error::Api(ErrorResponse {
            code: 404,
            message: "not found".to_string(),
            ..Default::default()
        });

        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert!(err.is_error_response());
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_status_absent_for_other_kinds() {
        assert_eq!(Error::Timeout.status(), None);
        assert!(Error::Timeout.is_transport());
        assert!(!Error::EmptyPage.is_error_response());
    }

    #[test]
    fn test_multipart_file_error_names_path() {
        let err = Error::MultipartFile {
            path: PathBuf::from("/missing/avatar.png"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };

        assert!(err.to_string().contains("/missing/avatar.png"));
    }
}
