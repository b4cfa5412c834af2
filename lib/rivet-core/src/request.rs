//! Outgoing HTTP request.
//!
//! Requests are assembled with [`Request::builder`]; query values are
//! percent-encoded by the URL serializer, never by callers.
//!
//! # Example
//!
//! ```
//! use rivet_core::{Method, Request};
//!
//! let url = "https://api.example.com/users".parse().unwrap();
//! let request = Request::builder(Method::Get, url)
//!     .header("Accept", "application/json")
//!     .query("limit", "10")
//!     .build();
//!
//! assert_eq!(request.url().as_str(), "https://api.example.com/users?limit=10");
//! ```

use bytes::Bytes;
use url::Url;

use crate::{Form, HeaderValue, Headers, Method};

const JSON: &str = "application/json";

/// The resource operation a request belongs to.
///
/// Resource services tag every request they send; middleware reads the tag
/// (e.g. the logging span records it). The transport ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    /// Operation name: `list`, `get`, `create`, `search_delete`, `raw`, ...
    pub name: &'static str,
    /// Base path of the model, e.g. `/users`.
    pub model: &'static str,
}

/// An HTTP request with method, URL, headers, and optional body.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: Url,
    headers: Headers,
    body: Option<Bytes>,
    operation: Option<Operation>,
}

impl Request {
    /// Creates a new [`RequestBuilder`].
    #[must_use]
    pub fn builder(method: Method, url: Url) -> RequestBuilder {
        RequestBuilder::new(method, url)
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Request URL, query string included.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Mutable access to headers.
    #[must_use]
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// First value of a header.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(HeaderValue::first)
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Decoded `(name, value)` query pairs, in URL order.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.url
            .query_pairs()
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect()
    }

    /// Resource operation tag, when sent by a resource service.
    #[must_use]
    pub const fn operation(&self) -> Option<Operation> {
        self.operation
    }

    /// Tag the request with the resource operation it performs.
    #[must_use]
    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = Some(operation);
        self
    }

    /// Consume into (method, url, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (Method, Url, Headers, Option<Bytes>) {
        (self.method, self.url, self.headers, self.body)
    }
}

/// Builder for [`Request`].
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    url: Url,
    headers: Headers,
    body: Option<Bytes>,
}

impl RequestBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Headers::new(),
            body: None,
        }
    }

    /// Sets a header, overwriting any previous value.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<HeaderValue>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Merges a header map, overwriting duplicates.
    #[must_use]
    pub fn headers(mut self, headers: &Headers) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Appends one query parameter.
    #[must_use]
    pub fn query(mut self, name: &str, value: &str) -> Self {
        self.url.query_pairs_mut().append_pair(name, value);
        self
    }

    /// Appends query parameters, keeping their order.
    #[must_use]
    pub fn query_pairs<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut pairs = pairs.into_iter().peekable();
        if pairs.peek().is_some() {
            let mut query = self.url.query_pairs_mut();
            for (name, value) in pairs {
                query.append_pair(name.as_ref(), value.as_ref());
            }
        }
        self
    }

    /// Sets the raw request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets a JSON body and its `Content-Type`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn json<T: serde::Serialize + ?Sized>(self, value: &T) -> crate::Result<Self> {
        let body = serde_json::to_vec(value)?;
        Ok(self.header("Content-Type", JSON).body(body))
    }

    /// Sets a `multipart/form-data` body.
    #[must_use]
    pub fn multipart(self, form: Form) -> Self {
        let (content_type, body) = form.into_body();
        self.header("Content-Type", content_type).body(body)
    }

    /// Builds the [`Request`].
    #[must_use]
    pub fn build(self) -> Request {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
            operation: None,
        }
    }
}
