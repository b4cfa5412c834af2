//! Per-model resource service.
//!
//! A [`ResourceService`] maps method calls onto the REST conventions of one
//! resource collection:
//!
//! | Operation | HTTP |
//! |-----------|------|
//! | [`list`](ResourceService::list) | `GET {api_url}` |
//! | [`get`](ResourceService::get) | `GET {api_url}/{id}` |
//! | [`create`](ResourceService::create) | `POST {api_url}` |
//! | [`update`](ResourceService::update) | `PUT {api_url}/{id}` |
//! | [`patch`](ResourceService::patch) | `PATCH {api_url}/{id}` |
//! | [`remove`](ResourceService::remove) | `DELETE {api_url}/{id}` |
//! | [`search`](ResourceService::search) | `GET`, `PATCH` or `DELETE {api_url}/search` |
//! | [`upload`](ResourceService::upload) | `POST {api_url}/upload` |
//! | [`upload_for`](ResourceService::upload_for) | `POST {api_url}/{id}/upload` |
//!
//! Every operation issues exactly one request. Non-2xx answers fail with
//! [`Error::Http`]; nothing is retried.

use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::{
    ApiConfig, Error, Filters, Form, Headers, HttpClient, HyperClient, Identified,
    IntoFilterValue, ListResponse, Merge, Method, Model, Operation, Request, RequestOptions,
    Response, Result, materialize, materialize_list, merge_response,
    query::GetQuery,
    search::{SearchOutcome, SearchQuery, SearchVerb},
};

/// REST façade for the model type `M`, sending requests through `C`.
///
/// The endpoint URL (`api_url`) is resolved once, at construction.
///
/// ```ignore
/// let users = ResourceService::<User>::new(HyperClient::new());
///
/// let page = users.find_all().limit(20).order_by_asc("name").list().await?;
/// let mut user = users.get(&42).await?;
/// user.name = "Ada".into();
/// users.update(&mut user).await?;
/// ```
pub struct ResourceService<M, C = HyperClient> {
    api_url: String,
    client: C,
    _model: PhantomData<fn() -> M>,
}

impl<M, C: Clone> Clone for ResourceService<M, C> {
    fn clone(&self) -> Self {
        Self {
            api_url: self.api_url.clone(),
            client: self.client.clone(),
            _model: PhantomData,
        }
    }
}

impl<M, C> fmt::Debug for ResourceService<M, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceService")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl<M, C> ResourceService<M, C> {
    /// Endpoint URL: base URL joined with [`Model::BASE_PATH`].
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// The transport.
    #[must_use]
    pub const fn client(&self) -> &C {
        &self.client
    }
}

impl<M, C> ResourceService<M, C>
where
    M: Model,
    C: HttpClient,
{
    /// Service resolved against the global [`ApiConfig`].
    pub fn new(client: C) -> Self {
        Self::with_config(ApiConfig::global(), client)
    }

    /// Service resolved against `config`.
    pub fn with_config(config: &ApiConfig, client: C) -> Self {
        Self::with_api_url(config.resolve(M::BASE_PATH), client)
    }

    /// Service targeting an explicit endpoint URL.
    pub fn with_api_url(api_url: impl Into<String>, client: C) -> Self {
        Self {
            api_url: api_url.into(),
            client,
            _model: PhantomData,
        }
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    /// Fetch the whole collection.
    pub async fn list(&self) -> Result<ListResponse<M>> {
        self.fetch_list(&[], None).await
    }

    /// Fetch one resource.
    pub async fn get(&self, id: &M::Id) -> Result<M> {
        self.fetch_one(id, &[], None).await
    }

    /// Start a collection read.
    #[must_use]
    pub fn find_all(&self) -> GetQuery<'_, M, C> {
        GetQuery::new(self, None)
    }

    /// Start a single-resource read.
    #[must_use]
    pub fn find_by_id(&self, id: M::Id) -> GetQuery<'_, M, C> {
        GetQuery::new(self, Some(id))
    }

    /// Start a search with a first filter.
    ///
    /// List values are sent comma-joined: `find_where("id", [1, 2])` sends `id=1,2`.
    #[must_use]
    pub fn find_where(
        &self,
        field: impl Into<String>,
        value: impl IntoFilterValue,
    ) -> SearchQuery<'_, M, C> {
        SearchQuery::new(self, Filters::seeded(field, value))
    }

    /// `GET {api_url}/{id}` with the given query pairs and headers.
    pub async fn fetch_one(
        &self,
        id: &M::Id,
        params: &[(String, String)],
        headers: Option<&Headers>,
    ) -> Result<M> {
        let url = self.endpoint([id.to_string()])?;
        let request = Self::read_request(url, params, headers);
        let response = self.send("get", request).await?;

        let model = materialize::<M>(response.body())?;
        trace!(model = M::BASE_PATH, "materialized 1 record");
        Ok(model)
    }

    /// `GET {api_url}` with the given query pairs and headers.
    pub async fn fetch_list(
        &self,
        params: &[(String, String)],
        headers: Option<&Headers>,
    ) -> Result<ListResponse<M>> {
        let url = self.endpoint(None::<&str>)?;
        let request = Self::read_request(url, params, headers);
        let response = self.send("list", request).await?;

        Self::materialize_envelope(&response)
    }

    // ------------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------------

    /// `POST {api_url}` with `resource` as body, then merge the response into it.
    pub async fn create<'r>(&self, resource: &'r mut M) -> Result<&'r mut M> {
        let url = self.endpoint(None::<&str>)?;
        let request = Request::builder(Method::Post, url).json(&*resource)?.build();
        let response = self.send("create", request).await?;

        merge_response(resource, response.body())?;
        Ok(resource)
    }

    /// `PUT {api_url}/{id}` with `resource` as body, then merge the response into it.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::MissingId`] before sending when `resource` has no identifier.
    pub async fn update<'r>(&self, resource: &'r mut M) -> Result<&'r mut M> {
        let url = self.resource_endpoint(&*resource)?;
        let request = Request::builder(Method::Put, url).json(&*resource)?.build();
        let response = self.send("update", request).await?;

        merge_response(resource, response.body())?;
        Ok(resource)
    }

    /// `PATCH {api_url}/{id}` with a partial record, then merge the response into it.
    ///
    /// `partial` can be the model itself or any record sharing its identifier,
    /// such as a `#[derive(Identified)]` struct holding the changed fields.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::MissingId`] before sending when `partial` has no identifier.
    pub async fn patch<'r, P>(&self, partial: &'r mut P) -> Result<&'r mut P>
    where
        P: Identified<Id = M::Id> + Merge + Serialize + Send,
    {
        let url = self.resource_endpoint(&*partial)?;
        let request = Request::builder(Method::Patch, url)
            .json(&*partial)?
            .build();
        let response = self.send("patch", request).await?;

        merge_response(partial, response.body())?;
        Ok(partial)
    }

    /// `DELETE {api_url}/{id}`. The response body is ignored.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::MissingId`] before sending when `resource` has no identifier.
    pub async fn remove<'r>(&self, resource: &'r M) -> Result<&'r M> {
        let url = self.resource_endpoint(resource)?;
        self.send("remove", Request::builder(Method::Delete, url).build())
            .await?;
        Ok(resource)
    }

    // ------------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------------

    /// Call `{api_url}/search` with `verb`.
    ///
    /// `Get` materializes the list envelope. `Patch` sends `body` as JSON;
    /// `Patch` and `Delete` ignore the response body.
    pub async fn search(
        &self,
        verb: SearchVerb,
        params: &[(String, String)],
        headers: Option<&Headers>,
        body: Option<&Value>,
    ) -> Result<SearchOutcome<M>> {
        let url = self.endpoint(["search"])?;
        let mut builder = Request::builder(verb.into(), url).query_pairs(Self::borrowed(params));
        if let Some(headers) = headers {
            builder = builder.headers(headers);
        }
        if let (SearchVerb::Patch, Some(body)) = (verb, body) {
            builder = builder.json(body)?;
        }
        let response = self.send(verb.operation(), builder.build()).await?;

        match verb {
            SearchVerb::Get => Self::materialize_envelope(&response).map(SearchOutcome::List),
            SearchVerb::Patch | SearchVerb::Delete => Ok(SearchOutcome::Done),
        }
    }

    // ------------------------------------------------------------------------
    // Uploads
    // ------------------------------------------------------------------------

    /// `POST {api_url}/upload` with a multipart body.
    ///
    /// The response is deserialized as `R`, without materialization.
    pub async fn upload<R: DeserializeOwned>(&self, form: Form) -> Result<R> {
        let url = self.endpoint(["upload"])?;
        self.send_upload(url, form).await
    }

    /// `POST {api_url}/{id}/upload` with a multipart body.
    ///
    /// The response is deserialized as `R`, without materialization.
    pub async fn upload_for<R: DeserializeOwned>(&self, id: &M::Id, form: Form) -> Result<R> {
        let url = self.endpoint([id.to_string(), "upload".to_string()])?;
        self.send_upload(url, form).await
    }

    async fn send_upload<R: DeserializeOwned>(&self, url: Url, form: Form) -> Result<R> {
        let request = Request::builder(Method::Post, url).multipart(form).build();
        self.send("upload", request).await?.json()
    }

    // ------------------------------------------------------------------------
    // Raw pass-through
    // ------------------------------------------------------------------------

    /// `GET {api_url}[/path]`, response returned as is.
    ///
    /// `path` is appended verbatim: it is neither split nor re-encoded, and
    /// may carry its own query string.
    pub async fn raw_get(&self, path: Option<&str>, options: RequestOptions) -> Result<Response> {
        self.raw(Method::Get, path, options).await
    }

    /// `POST {api_url}[/path]`, response returned as is.
    pub async fn raw_post(&self, path: Option<&str>, options: RequestOptions) -> Result<Response> {
        self.raw(Method::Post, path, options).await
    }

    /// `PUT {api_url}[/path]`, response returned as is.
    pub async fn raw_put(&self, path: Option<&str>, options: RequestOptions) -> Result<Response> {
        self.raw(Method::Put, path, options).await
    }

    /// `PATCH {api_url}[/path]`, response returned as is.
    pub async fn raw_patch(&self, path: Option<&str>, options: RequestOptions) -> Result<Response> {
        self.raw(Method::Patch, path, options).await
    }

    /// `DELETE {api_url}[/path]`, response returned as is.
    pub async fn raw_delete(
        &self,
        path: Option<&str>,
        options: RequestOptions,
    ) -> Result<Response> {
        self.raw(Method::Delete, path, options).await
    }

    async fn raw(
        &self,
        method: Method,
        path: Option<&str>,
        options: RequestOptions,
    ) -> Result<Response> {
        let url = match path {
            Some(path) if !path.is_empty() => format!(
                "{}/{}",
                self.api_url.trim_end_matches('/'),
                path.trim_start_matches('/')
            ),
            _ => self.api_url.clone(),
        };
        let url = parse_endpoint(&url)?;
        let request = options.apply(Request::builder(method, url)).build();
        self.send("raw", request).await
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    /// `api_url` with `segments` appended, each one percent-encoded.
    fn endpoint<I, S>(&self, segments: I) -> Result<Url>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut url = parse_endpoint(&self.api_url)?;
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                Error::invalid_request(format!("`{}` cannot be a base URL", self.api_url))
            })?;
            let mut segments = segments.into_iter().peekable();
            if segments.peek().is_some() {
                path.pop_if_empty();
                for segment in segments {
                    path.push(segment.as_ref());
                }
            }
        }
        Ok(url)
    }

    fn resource_endpoint<R: Identified<Id = M::Id>>(&self, resource: &R) -> Result<Url> {
        let id = resource
            .id()
            .ok_or(Error::MissingId { model: M::BASE_PATH })?;
        self.endpoint([id.to_string()])
    }

    fn read_request(url: Url, params: &[(String, String)], headers: Option<&Headers>) -> Request {
        let builder = Request::builder(Method::Get, url).query_pairs(Self::borrowed(params));
        match headers {
            Some(headers) => builder.headers(headers).build(),
            None => builder.build(),
        }
    }

    fn borrowed(params: &[(String, String)]) -> impl Iterator<Item = (&str, &str)> {
        params.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    fn materialize_envelope(response: &Response) -> Result<ListResponse<M>> {
        let list = materialize_list::<M>(response.body())?;
        trace!(
            model = M::BASE_PATH,
            records = list.len(),
            count = ?list.count(),
            "materialized list"
        );
        Ok(list)
    }

    async fn send(&self, operation: &'static str, request: Request) -> Result<Response> {
        debug!(
            operation,
            model = M::BASE_PATH,
            method = %request.method(),
            url = %request.url(),
            "sending resource request"
        );
        let request = request.with_operation(Operation {
            name: operation,
            model: M::BASE_PATH,
        });
        self.client.execute(request).await?.error_for_status()
    }
}

/// An endpoint that is only a path means no base URL was configured.
fn parse_endpoint(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|source| match source {
        url::ParseError::RelativeUrlWithoutBase if url.starts_with('/') => Error::BaseUrlUnset {
            path: url.to_string(),
        },
        source => Error::InvalidUrl {
            url: url.to_string(),
            source,
        },
    })
}
