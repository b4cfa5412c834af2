//! Fluent read builder.

use std::fmt;

use crate::{
    Direction, Error, HeaderValue, HttpClient, ListResponse, Model, QueryParams, ResourceService,
    Result,
};

/// Result of [`GetQuery::get`]: one resource or a list envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum GetResult<M> {
    /// The query targeted an identifier.
    One(M),
    /// The query targeted the collection.
    List(ListResponse<M>),
}

impl<M> GetResult<M> {
    /// The resource, if the query targeted an identifier.
    #[must_use]
    pub fn into_one(self) -> Option<M> {
        match self {
            Self::One(model) => Some(model),
            Self::List(_) => None,
        }
    }

    /// The envelope, if the query targeted the collection.
    #[must_use]
    pub fn into_list(self) -> Option<ListResponse<M>> {
        match self {
            Self::One(_) => None,
            Self::List(list) => Some(list),
        }
    }
}

/// Read query created by [`ResourceService::find_all`] or
/// [`ResourceService::find_by_id`].
///
/// Modifiers only record state; the request is sent by [`get`](Self::get),
/// [`one`](Self::one) or [`list`](Self::list). Each terminal call sends a
/// new request.
///
/// ```ignore
/// let users = service
///     .find_all()
///     .only(["id", "name"])
///     .limit(20)
///     .page(2)
///     .order_by("created_at", Direction::Desc)
///     .fresh()
///     .list()
///     .await?;
/// ```
pub struct GetQuery<'s, M: Model, C> {
    service: &'s ResourceService<M, C>,
    id: Option<M::Id>,
    params: QueryParams,
}

impl<M: Model, C> fmt::Debug for GetQuery<'_, M, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GetQuery")
            .field("api_url", &self.service.api_url())
            .field("id", &self.id.as_ref().map(ToString::to_string))
            .field("params", &self.params)
            .finish()
    }
}

impl<'s, M, C> GetQuery<'s, M, C>
where
    M: Model,
    C: HttpClient,
{
    pub(crate) fn new(service: &'s ResourceService<M, C>, id: Option<M::Id>) -> Self {
        Self {
            service,
            id,
            params: QueryParams::new(),
        }
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

    /// Target identifier, if any.
    #[must_use]
    pub fn id(&self) -> Option<&M::Id> {
        self.id.as_ref()
    }

    /// Accumulated parameters.
    #[must_use]
    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    /// Send the query: `GET {api_url}/{id}` with an identifier,
    /// `GET {api_url}` without.
    pub async fn get(&self) -> Result<GetResult<M>> {
        let pairs = self.params.to_pairs();
        let headers = self.params.headers();
        match &self.id {
            Some(id) => self
                .service
                .fetch_one(id, &pairs, headers)
                .await
                .map(GetResult::One),
            None => self
                .service
                .fetch_list(&pairs, headers)
                .await
                .map(GetResult::List),
        }
    }

    /// Fetch the targeted resource.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::MissingId`] before sending when the query has no identifier.
    pub async fn one(&self) -> Result<M> {
        let Some(id) = &self.id else {
            return Err(Error::MissingId { model: M::BASE_PATH });
        };
        self.service
            .fetch_one(id, &self.params.to_pairs(), self.params.headers())
            .await
    }

    /// Fetch the collection.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidRequest`] before sending when the query
    /// targets an identifier.
    pub async fn list(&self) -> Result<ListResponse<M>> {
        if self.id.is_some() {
            return Err(Error::invalid_request(format!(
                "{} query targets one resource, use `one()`",
                M::BASE_PATH
            )));
        }
        self.service
            .fetch_list(&self.params.to_pairs(), self.params.headers())
            .await
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::HyperClient;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Model)]
    #[model(path = "/tags")]
    struct Tag {
        id: Option<u32>,
        label: String,
    }

    fn service() -> ResourceService<Tag, HyperClient> {
        ResourceService::with_api_url("http://localhost/tags", HyperClient::new())
    }

    #[test]
    fn debug_shows_endpoint_and_identifier() {
        let service = service();
        let mut query = service.find_by_id(3);
        query.limit(1);

        let rendered = format!("{query:?}");
        check!(rendered.contains(r#"api_url: "http://localhost/tags""#));
        check!(rendered.contains(r#"id: Some("3")"#));
    }

    #[test]
    fn modifiers_accumulate_without_io() {
        let service = service();
        let mut query = service.find_all();
        query
            .only(["id"])
            .only(["label"])
            .limit(5)
            .limit(10)
            .order_by_asc("label")
            .order_by("id", Direction::Desc)
            .fresh();

        check!(query.id().is_none());
        check!(query.params().fields() == ["id", "label"]);
        check!(
            query.params().to_pairs()
                == vec![
                    ("only".to_string(), "id,label".to_string()),
                    ("limit".to_string(), "10".to_string()),
                    ("order".to_string(), r#"[["label","asc"],["id","desc"]]"#.to_string()),
                ]
        );
        check!(query.params().headers().is_some());
    }

    #[test]
    fn find_by_id_keeps_identifier() {
        let service = service();
        let query = service.find_by_id(7);

        check!(query.id() == Some(&7));
        check!(query.params().headers().is_none());
    }

    #[tokio::test]
    async fn one_without_identifier_fails_before_sending() {
        let service = service();
        let err = service.find_all().one().await.expect_err("no identifier");
        check!(matches!(err, Error::MissingId { model: "/tags" }));
    }

    #[tokio::test]
    async fn list_with_identifier_fails_before_sending() {
        let service = service();
        let err = service.find_by_id(1).list().await.expect_err("identifier set");
        check!(matches!(err, Error::InvalidRequest(_)));
    }

    #[test]
    fn get_result_accessors() {
        let tag = Tag {
            id: Some(1),
            label: "rust".into(),
        };
        check!(GetResult::One(tag.clone()).into_one() == Some(tag.clone()));
        check!(GetResult::One(tag).into_list().is_none());
        check!(GetResult::<Tag>::List(ListResponse::default()).into_one().is_none());
    }
}
