//! Fluent search builder over `{api_url}/search`.

use std::fmt;

use derive_more::Display;
use serde::Serialize;

use crate::{
    Direction, Filters, HeaderValue, HttpClient, IntoFilterValue, ListResponse, Method, Model,
    QueryParams, ResourceService, Result,
};

/// HTTP verb of a search call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum SearchVerb {
    /// Read the matching resources.
    #[display("GET")]
    Get,
    /// Apply a partial update to the matching resources.
    #[display("PATCH")]
    Patch,
    /// Delete the matching resources.
    #[display("DELETE")]
    Delete,
}

impl SearchVerb {
    pub(crate) const fn operation(self) -> &'static str {
        match self {
            Self::Get => "search",
            Self::Patch => "search_patch",
            Self::Delete => "search_remove",
        }
    }
}

impl From<SearchVerb> for Method {
    fn from(verb: SearchVerb) -> Self {
        match verb {
            SearchVerb::Get => Self::Get,
            SearchVerb::Patch => Self::Patch,
            SearchVerb::Delete => Self::Delete,
        }
    }
}

/// What a search call produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome<M> {
    /// Matching resources, for [`SearchVerb::Get`].
    List(ListResponse<M>),
    /// The server accepted a patch or delete.
    Done,
}

/// Search created by [`ResourceService::find_where`].
///
/// Holds the read parameters of a [`GetQuery`](crate::GetQuery) plus ordered
/// filters. Filters go on the query string after the read parameters, in the
/// order they were added.
///
/// ```ignore
/// service
///     .find_where("id", [1, 2, 3])
///     .remove()
///     .await?; // DELETE {api_url}/search?id=1,2,3
/// ```
pub struct SearchQuery<'s, M, C> {
    service: &'s ResourceService<M, C>,
    params: QueryParams,
    filters: Filters,
}

impl<M, C> fmt::Debug for SearchQuery<'_, M, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchQuery")
            .field("service", self.service)
            .field("params", &self.params)
            .field("filters", &self.filters)
            .finish()
    }
}

impl<'s, M, C> SearchQuery<'s, M, C>
where
    M: Model,
    C: HttpClient,
{
    pub(crate) fn new(service: &'s ResourceService<M, C>, filters: Filters) -> Self {
        Self {
            service,
            params: QueryParams::new(),
            filters,
        }
    }

    /// Add a filter after the existing ones.
    pub fn and_where(&mut self, field: impl Into<String>, value: impl IntoFilterValue) -> &mut Self {
        self.filters.push(field, value);
        self
    }

    /// Select fields. Calls accumulate; duplicates are kept.
    pub fn only<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params.only(fields);
        self
    }

    /// Page size. The last call wins.
    pub fn limit(&mut self, limit: i64) -> &mut Self {
        self.params.limit(limit);
        self
    }

    /// Page number. The last call wins.
    pub fn page(&mut self, page: i64) -> &mut Self {
        self.params.page(page);
        self
    }

    /// Sort by `field`. Calls accumulate in order.
    pub fn order_by(&mut self, field: impl Into<String>, direction: Direction) -> &mut Self {
        self.params.order_by(field, direction);
        self
    }

    /// Sort by `field`, ascending.
    pub fn order_by_asc(&mut self, field: impl Into<String>) -> &mut Self {
        self.order_by(field, Direction::Asc)
    }

    /// Set or overwrite a request header.
    pub fn header(&mut self, name: impl Into<String>, value: impl Into<HeaderValue>) -> &mut Self {
        self.params.header(name, value);
        self
    }

    /// Bypass intermediary caches (`no-cache: 1`).
    pub fn fresh(&mut self) -> &mut Self {
        self.params.fresh();
        self
    }

    /// Accumulated read parameters.
    #[must_use]
    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    /// Accumulated filters.
    #[must_use]
    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    /// Query pairs: read parameters, then filters.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = self.params.to_pairs();
        pairs.extend(self.filters.to_pairs());
        pairs
    }

    /// `GET {api_url}/search`: the matching resources.
    pub async fn get(&self) -> Result<ListResponse<M>> {
        match self.send(SearchVerb::Get, None).await? {
            SearchOutcome::List(list) => Ok(list),
            SearchOutcome::Done => Ok(ListResponse::default()),
        }
    }

    /// `DELETE {api_url}/search`: delete the matching resources.
    pub async fn remove(&self) -> Result<()> {
        self.send(SearchVerb::Delete, None).await.map(drop)
    }

    /// `PATCH {api_url}/search` with `body` as JSON: update the matching resources.
    pub async fn patch<B: Serialize + ?Sized>(&self, body: &B) -> Result<()> {
        let body = serde_json::to_value(body)?;
        self.send(SearchVerb::Patch, Some(&body)).await.map(drop)
    }

    async fn send(
        &self,
        verb: SearchVerb,
        body: Option<&serde_json::Value>,
    ) -> Result<SearchOutcome<M>> {
        self.service
            .search(verb, &self.to_pairs(), self.params.headers(), body)
            .await
    }
}
