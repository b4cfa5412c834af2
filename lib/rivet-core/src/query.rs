//! Read-query state: field selection, pagination, ordering, headers.
//!
//! [`QueryParams`] is a plain accumulator. Serialization ([`QueryParams::to_pairs`],
//! [`QueryParams::headers`]) only reads it, so it can run any number of times.
//!
//! ```
//! use rivet_core::{Direction, QueryParams};
//!
//! let mut params = QueryParams::new();
//! params.only(["id", "name"]).limit(10).order_by("name", Direction::Desc);
//!
//! assert_eq!(
//!     params.to_pairs(),
//!     vec![
//!         ("only".to_string(), "id,name".to_string()),
//!         ("limit".to_string(), "10".to_string()),
//!         ("order".to_string(), r#"[["name","desc"]]"#.to_string()),
//!     ]
//! );
//! ```

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::{HeaderValue, Headers};

/// Sort direction of an `order` entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending.
    #[default]
    #[display("asc")]
    Asc,
    /// Descending.
    #[display("desc")]
    Desc,
}

/// Header set by [`QueryParams::fresh`].
pub const NO_CACHE_HEADER: &str = "no-cache";

/// Accumulated read-query parameters and extra headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    only: Vec<String>,
    limit: Option<i64>,
    page: Option<i64>,
    order: Vec<(String, Direction)>,
    headers: Headers,
}

impl QueryParams {
    /// Empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append fields to the selection. Duplicates are kept.
    pub fn only<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Set the page size. The last call wins; the value is not validated.
    pub fn limit(&mut self, limit: i64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    /// Set the page number. The last call wins; the value is not validated.
    pub fn page(&mut self, page: i64) -> &mut Self {
        self.page = Some(page);
        self
    }

    /// Append an ordering entry after the existing ones.
    pub fn order_by(&mut self, field: impl Into<String>, direction: Direction) -> &mut Self {
        self.order.push((field.into(), direction));
        self
    }

    /// Set or overwrite a header.
    pub fn header(&mut self, name: impl Into<String>, value: impl Into<HeaderValue>) -> &mut Self {
        self.headers.insert(name, value);
        self
    }

    /// Ask intermediaries to bypass their cache (`no-cache: 1`).
    pub fn fresh(&mut self) -> &mut Self {
        self.header(NO_CACHE_HEADER, "1")
    }

    /// Selected fields, in insertion order.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.only
    }

    /// Ordering entries, in call order.
    #[must_use]
    pub fn ordering(&self) -> &[(String, Direction)] {
        &self.order
    }

    /// Query pairs in wire order: `only`, `limit`, `page`, `order`.
    ///
    /// Unset parameters are omitted. `order` is a JSON array of
    /// `[field, direction]` pairs, left unencoded: percent-encoding is the
    /// request URL's job.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(4);
        if !self.only.is_empty() {
            pairs.push(("only".to_string(), self.only.join(",")));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if !self.order.is_empty() {
            pairs.push(("order".to_string(), self.order_json()));
        }
        pairs
    }

    /// Extra headers, or `None` when no header was set.
    #[must_use]
    pub fn headers(&self) -> Option<&Headers> {
        (!self.headers.is_empty()).then_some(&self.headers)
    }

    fn order_json(&self) -> String {
        let entries: Vec<(&str, Direction)> = self
            .order
            .iter()
            .map(|(field, direction)| (field.as_str(), *direction))
            .collect();
        // Tuples serialize as `[field, direction]` arrays; this cannot fail.
        serde_json::to_string(&entries).unwrap_or_default()
    }
}
