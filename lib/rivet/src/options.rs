//! Per-call options for raw pass-through requests.

use bytes::Bytes;
use serde::Serialize;

use crate::{HeaderValue, Headers, RequestBuilder, Result};

/// Query pairs, headers and body of a raw call.
///
/// ```
/// use rivet::RequestOptions;
///
/// let options = RequestOptions::new()
///     .query("period", "week")
///     .header("X-Tenant", "acme");
/// assert_eq!(options.query_pairs().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    query: Vec<(String, String)>,
    headers: Headers,
    /// Content type and payload.
    body: Option<(&'static str, Bytes)>,
}

impl RequestOptions {
    /// No query, no header, no body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a query pair.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Set or overwrite a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<HeaderValue>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Merge a header map, overwriting duplicates.
    #[must_use]
    pub fn headers(mut self, headers: &Headers) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Send `value` as a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self> {
        let body = serde_json::to_vec(value)?;
        self.body = Some(("application/json", Bytes::from(body)));
        Ok(self)
    }

    /// Send raw bytes as the body.
    #[must_use]
    pub fn bytes(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(("application/octet-stream", body.into()));
        self
    }

    /// Query pairs, in insertion order.
    #[must_use]
    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub(crate) fn apply(self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.query_pairs(self.query).headers(&self.headers);
        match self.body {
            Some((content_type, body)) => builder.header("Content-Type", content_type).body(body),
            None => builder,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use url::Url;

    use super::*;
    use crate::{Method, Request};

    #[test]
    fn apply_sets_query_headers_and_body() {
        let options = RequestOptions::new()
            .query("period", "week")
            .query("tag", "a,b")
            .header("X-Tenant", "acme")
            .json(&serde_json::json!({ "dry_run": true }));
        let_assert!(Ok(options) = options);

        let url = Url::parse("http://localhost/stats").expect("valid url");
        let request = options.apply(Request::builder(Method::Post, url)).build();

        check!(request.url().query() == Some("period=week&tag=a%2Cb"));
        check!(request.header("X-Tenant") == Some("acme"));
        check!(request.header("Content-Type") == Some("application/json"));
        check!(request.body() == Some(&Bytes::from_static(br#"{"dry_run":true}"#)));
    }

    #[test]
    fn bytes_are_sent_as_octet_stream() {
        let url = Url::parse("http://localhost/import").expect("valid url");
        let request = RequestOptions::new()
            .bytes("id,name\n1,Ada\n")
            .apply(Request::builder(Method::Post, url))
            .build();

        check!(request.header("Content-Type") == Some("application/octet-stream"));
        check!(request.body().map(Bytes::len) == Some(14));
    }

    #[test]
    fn empty_options_leave_request_untouched() {
        let url = Url::parse("http://localhost/stats").expect("valid url");
        let request = RequestOptions::new()
            .apply(Request::builder(Method::Get, url))
            .build();

        check!(request.url().as_str() == "http://localhost/stats");
        check!(request.headers().is_empty());
        check!(request.body().is_none());
    }
}
