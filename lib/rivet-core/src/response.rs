//! Buffered HTTP response.

use std::collections::HashMap;

use bytes::Bytes;
use http::StatusCode;
use serde::de::DeserializeOwned;

use crate::{Error, Result, decode_json};

/// A response whose body has been read in full.
///
/// Header names are lowercase; repeated headers are folded with `", "`.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HashMap<String, String>,
    body: Bytes,
}

impl Response {
    /// Response from its parts.
    #[must_use]
    pub fn new(status: StatusCode, headers: HashMap<String, String>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Numeric status.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status.as_u16()
    }

    /// Status, typed.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.status
    }

    /// All headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Header by lowercase name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Raw body.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Nothing but whitespace. Write merges treat such bodies as "no change".
    #[must_use]
    pub fn is_body_empty(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }

    /// Consume into the body.
    #[must_use]
    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Pass 2xx responses through; anything else becomes [`Error::Http`]
    /// carrying the status and the untouched body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] when the status is not 2xx.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::Http {
                status: self.status,
                body: self.body,
            })
        }
    }

    /// Decode the body as JSON, without materialization.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] with the JSON path of the mismatch.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        decode_json(&self.body)
    }

    /// Body as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid UTF-8.
    pub fn text(self) -> std::result::Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.to_vec())
    }
}
