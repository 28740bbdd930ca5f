//! Response decoding helpers.
//!
//! Paginated list endpoints answer with `{"total", "limit", "skip", "data"}`
//! and failing endpoints with an [`ErrorResponse`]. The extraction helpers
//! validate the status first, so callers get either their records or the
//! service's structured error.

use crate::{Error, Response, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

const FALLBACK_ERROR_NAME: &str = "No standard error found";
const PARSED_ERROR_KEY: &str = "parsed error";

/// The conventional shape returned by list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct PaginatedResponse<T = Value> {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub data: Vec<T>,
}

/// Structured error body returned by services.
///
/// Implements [`std::error::Error`] and travels inside [`Error::Api`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub code: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub class_name: String,
    /// Field-level detail.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
    /// Field-level validation errors.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, String>,
}

fn is_zero(code: &i64) -> bool {
    *code == 0
}

impl ErrorResponse {
    fn fallback(status: u16, cause: impl fmt::Display) -> Self {
        Self {
            name: FALLBACK_ERROR_NAME.to_string(),
            code: i64::from(status),
            errors: BTreeMap::from([(PARSED_ERROR_KEY.to_string(), cause.to_string())]),
            ..Default::default()
        }
    }

    /// Returns `true` if this is the wrapper built for an unrecognized body.
    pub fn is_fallback(&self) -> bool {
        self.name == FALLBACK_ERROR_NAME
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        write!(f, "ERROR:  {}", json)
    }
}

impl std::error::Error for ErrorResponse {}

/// Converts any serializable value into the receiver's type.
///
/// The value is encoded to JSON and decoded again, which bridges loosely
/// typed data such as [`serde_json::Value`] and concrete structures.
///
/// # Errors
///
/// [`Error::InvalidTarget`] if the data does not fit `T`,
/// [`Error::DecodeFailed`] otherwise.
///
/// # Examples
///
/// ```
/// use blackbeard::decode_into;
/// use serde::Deserialize;
///
/// #[derive(Debug, Default, Deserialize)]
/// struct Record { id: u32 }
///
/// let mut record = Record::default();
/// decode_into(&serde_json::json!({"id": 3}), &mut record).unwrap();
/// assert_eq!(record.id, 3);
/// ```
pub fn decode_into<S, T>(data: &S, receiver: &mut T) -> Result<()>
where
    S: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let value = serde_json::to_value(data).map_err(|e| Error::DecodeFailed(e.to_string()))?;
    *receiver = serde_json::from_value(value).map_err(Error::from_serde)?;
    Ok(())
}

/// Decodes the raw body into a generic JSON value.
pub fn body_to_value(response: &Response) -> Result<Value> {
    serde_json::from_slice(response.body()).map_err(|e| Error::DecodeFailed(e.to_string()))
}

/// Builds the structured error carried by a failed response.
///
/// Never fails: a body that is not an [`ErrorResponse`] yields a fallback
/// wrapper carrying the status code and the decode failure.
pub fn parse_error(response: &Response) -> ErrorResponse {
    let status = response.status().as_u16();

    let value = match body_to_value(response) {
        Ok(value) => value,
        Err(e) => return ErrorResponse::fallback(status, e),
    };

    match serde_json::from_value::<ErrorResponse>(value) {
        Ok(remote) => remote,
        Err(e) => ErrorResponse::fallback(status, e),
    }
}

/// Validates the status and decodes the whole page.
///
/// # Errors
///
/// [`Error::Api`] for statuses outside 200-399, decode errors otherwise.
pub fn extract_page<T: DeserializeOwned>(response: &Response) -> Result<PaginatedResponse<T>> {
    if !response.is_success_range() {
        return Err(Error::Api(parse_error(response)));
    }

    serde_json::from_value(body_to_value(response)?).map_err(Error::from_serde)
}

/// Validates the status and decodes every record of the page.
///
/// # Examples
///
/// ```
/// use blackbeard::{extract_paginated, Response};
/// use http::{HeaderMap, StatusCode};
/// use serde::Deserialize;
/// use std::time::Duration;
///
/// #[derive(Deserialize)]
/// struct Record { id: u32 }
///
/// let body = r#"{"total":2,"limit":10,"skip":0,"data":[{"id":1},{"id":2}]}"#;
/// let response = Response::new(StatusCode::OK, HeaderMap::new(), body.into(), Duration::ZERO);
///
/// let records: Vec<Record> = extract_paginated(&response).unwrap();
/// assert_eq!(records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
/// ```
pub fn extract_paginated<T: DeserializeOwned>(response: &Response) -> Result<Vec<T>> {
    extract_page(response).map(|page| page.data)
}

/// Validates the status and decodes the first record of the page.
///
/// # Errors
///
/// [`Error::EmptyPage`] if the page has no records.
pub fn extract_first_paginated<T: DeserializeOwned>(response: &Response) -> Result<T> {
    let page = extract_page::<Value>(response)?;
    let first = page.data.into_iter().next().ok_or(Error::EmptyPage)?;
    serde_json::from_value(first).map_err(Error::from_serde)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{HeaderMap, StatusCode};
    use std::time::Duration;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Record {
        id: u32,
    }

    const PAGE: &str = r#"{"total":2,"limit":10,"skip":0,"data":[{"id":1},{"id":2}]}"#;

    fn response(status: u16, body: &'static str) -> Response {
        Response::new(
            StatusCode::from_u16(status).unwrap(),
            HeaderMap::new(),
            Bytes::from_static(body.as_bytes()),
            Duration::ZERO,
        )
    }

    #[test]
    fn test_extract_paginated() {
        let records: Vec<Record> = extract_paginated(&response(200, PAGE)).unwrap();
        assert_eq!(records, vec![Record { id: 1 }, Record { id: 2 }]);
    }

    #[test]
    fn test_extract_paginated_without_default_receiver() {
        #[derive(Debug, PartialEq, Deserialize)]
        struct Title(String);

        let titles: Vec<Title> = extract_paginated(&response(200, r#"{"data":["a","b"]}"#)).unwrap();
        assert_eq!(titles, vec![Title("a".to_string()), Title("b".to_string())]);

        let first: Title = extract_first_paginated(&response(200, r#"{"data":["a"]}"#)).unwrap();
        assert_eq!(first, Title("a".to_string()));
    }

    #[test]
    fn test_extract_page_metadata() {
        let page: PaginatedResponse<Record> = extract_page(&response(200, PAGE)).unwrap();
        assert_eq!((page.total, page.limit, page.skip), (2, 10, 0));
    }

    #[test]
    fn test_extract_first_paginated() {
        let record: Record = extract_first_paginated(&response(200, PAGE)).unwrap();
        assert_eq!(record, Record { id: 1 });
    }

    #[test]
    fn test_extract_first_from_empty_page() {
        let result = extract_first_paginated::<Record>(&response(200, r#"{"total":0,"data":[]}"#));
        assert!(matches!(result, Err(Error::EmptyPage)));
    }

    #[test]
    fn test_structured_error() {
        let result = extract_paginated::<Record>(&response(404, r#"{"name":"X","code":404,"message":"not found"}"#));

        match result {
            Err(Error::Api(remote)) => {
                assert_eq!(remote.code, 404);
                assert_eq!(remote.name, "X");
                assert!(remote.to_string().contains("not found"));
                assert!(!remote.is_fallback());
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_error_body_falls_back() {
        let result = extract_paginated::<Record>(&response(502, "<html>bad gateway</html>"));

        match result {
            Err(Error::Api(remote)) => {
                assert!(remote.is_fallback());
                assert_eq!(remote.code, 502);
                assert!(remote.errors.contains_key("parsed error"));
            }
            other => panic!("Expected fallback Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_error_shape_falls_back() {
        let remote = parse_error(&response(400, r#"{"code":"not a number"}"#));
        assert!(remote.is_fallback());
        assert_eq!(remote.code, 400);
    }

    #[test]
    fn test_error_display() {
        let remote = ErrorResponse {
            name: "NotFound".to_string(),
            code: 404,
            ..Default::default()
        };
        assert_eq!(remote.to_string(), r#"ERROR:  {"name":"NotFound","code":404}"#);
    }

    #[test]
    fn test_decode_into_shape_mismatch() {
        let mut record = Record::default();
        let err = decode_into(&serde_json::json!({"id": "one"}), &mut record).unwrap_err();
        assert!(err.is_invalid_target());
    }

    #[test]
    fn test_body_to_value() {
        let value = body_to_value(&response(200, r#"{"a":[1,2]}"#)).unwrap();
        assert_eq!(value["a"][1], 2);

        assert!(matches!(
            body_to_value(&response(200, "{")),
            Err(Error::DecodeFailed(_))
        ));
    }
}
