//! Request body encoding.
//!
//! A call carries a [`Payload`]: nothing, raw bytes, a JSON document, or a
//! [`MultipartBody`] that is turned into a `multipart/form-data` form when
//! the call is executed.

use crate::{Error, Result};
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const FILE_CONTENT_TYPE: &str = "application/octet-stream";

/// The body of one call.
#[derive(Debug, Clone, Default)]
pub enum Payload {
    /// No body.
    #[default]
    Empty,
    /// Bytes sent unchanged.
    Raw(Bytes),
    /// An already serialized JSON document.
    Json(Bytes),
    /// Form fields and files, encoded at send time.
    Multipart(MultipartBody),
}

/// A payload ready to be attached to a request.
pub(crate) enum EncodedBody {
    Bytes(Bytes),
    Form(Form),
}

impl EncodedBody {
    /// The content type this body requires, if it differs from the
    /// client's defaults.
    pub(crate) fn content_type(&self) -> Option<String> {
        match self {
            EncodedBody::Bytes(_) => None,
            EncodedBody::Form(form) => Some(format!("multipart/form-data; boundary={}", form.boundary())),
        }
    }
}

impl Payload {
    /// Serializes `value` to JSON.
    ///
    /// A value that serializes to `null` (for example `()` or `None`)
    /// produces [`Payload::Empty`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::SerializationFailed`] if `value` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let value = serde_json::to_value(value).map_err(|e| Error::SerializationFailed(e.to_string()))?;
        if value.is_null() {
            return Ok(Payload::Empty);
        }

        let bytes = serde_json::to_vec(&value).map_err(|e| Error::SerializationFailed(e.to_string()))?;
        Ok(Payload::Json(Bytes::from(bytes)))
    }

    /// Wraps bytes that are sent without any encoding.
    pub fn raw(bytes: impl Into<Bytes>) -> Self {
        Payload::Raw(bytes.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }

    /// Bytes identifying this payload in a cache fingerprint.
    ///
    /// Each kind starts with its own tag byte. Multipart payloads are
    /// identified by their fields and raw file paths, not by the encoded
    /// form whose boundary changes on every call.
    pub(crate) fn identity(&self) -> Vec<u8> {
        let mut id = Vec::new();
        match self {
            Payload::Empty => id.push(b'e'),
            Payload::Raw(bytes) => {
                id.push(b'r');
                id.extend_from_slice(bytes);
            }
            Payload::Json(bytes) => {
                id.push(b'j');
                id.extend_from_slice(bytes);
            }
            Payload::Multipart(body) => {
                id.push(b'm');
                body.write_identity(&mut id);
            }
        }
        id
    }

    /// Produces the body to send, or `None` for an empty payload.
    pub(crate) async fn encode(&self) -> Result<Option<EncodedBody>> {
        match self {
            Payload::Empty => Ok(None),
            Payload::Raw(bytes) | Payload::Json(bytes) => Ok(Some(EncodedBody::Bytes(bytes.clone()))),
            Payload::Multipart(body) => Ok(Some(EncodedBody::Form(body.form().await?))),
        }
    }
}

impl From<MultipartBody> for Payload {
    fn from(body: MultipartBody) -> Self {
        Payload::Multipart(body)
    }
}

/// Body of a multipart upload.
///
/// `params` maps form field names to values, `files` maps form part names to
/// the path of the file uploaded under that name.
///
/// # Examples
///
/// ```
/// use blackbeard::MultipartBody;
///
/// let body = MultipartBody::new()
///     .param("title", "holiday")
///     .file("photo", "/tmp/beach.jpg");
///
/// assert_eq!(body.params["title"], "holiday");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartBody {
    /// Plain form fields.
    pub params: BTreeMap<String, String>,
    /// File parts, by form name.
    pub files: BTreeMap<String, PathBuf>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a body from existing maps.
    pub fn from_parts(params: BTreeMap<String, String>, files: BTreeMap<String, PathBuf>) -> Self {
        Self { params, files }
    }

    /// Adds a plain form field.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Adds a file part read from `path` at encode time.
    pub fn file(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.files.insert(name.into(), path.into());
        self
    }

    /// Reads every file and builds the form.
    ///
    /// Files are added first, each under its base name, then the plain
    /// fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MultipartFile`] naming the first file that cannot be
    /// read. No form is returned in that case.
    pub async fn form(&self) -> Result<Form> {
        let mut form = Form::new();

        for (name, path) in &self.files {
            let contents = tokio::fs::read(path).await.map_err(|source| Error::MultipartFile {
                path: path.clone(),
                source,
            })?;

            let part = Part::bytes(contents)
                .file_name(file_name(path))
                .mime_str(FILE_CONTENT_TYPE)?;
            form = form.part(name.clone(), part);
        }

        for (name, value) in &self.params {
            form = form.text(name.clone(), value.clone());
        }

        Ok(form)
    }

    fn write_identity(&self, id: &mut Vec<u8>) {
        for (name, value) in &self.params {
            id.push(b'p');
            push_prefixed(id, name.as_bytes());
            push_prefixed(id, value.as_bytes());
        }
        for (name, path) in &self.files {
            id.push(b'f');
            push_prefixed(id, name.as_bytes());
            push_prefixed(id, path.as_os_str().as_encoded_bytes());
        }
    }
}

fn push_prefixed(id: &mut Vec<u8>, bytes: &[u8]) {
    id.extend_from_slice(&(bytes.len() as u64).to_be_bytes());
    id.extend_from_slice(bytes);
}

/// The base name sent as the part's file name, without control characters.
fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().chars().filter(|c| !c.is_control()).collect())
        .unwrap_or_default()
}
