//! Typed REST resource client.
//!
//! Declare a model once, then read and write it through a
//! [`ResourceService`] and its fluent builders.
//!
//! # Example
//!
//! ```ignore
//! use rivet::prelude::*;
//!
//! #[derive(Debug, Serialize, Deserialize, Model)]
//! #[model(path = "/users")]
//! pub struct User {
//!     id: Option<u64>,
//!     name: String,
//! }
//!
//! ApiConfig::global().set_base_url("https://api.example.com");
//! let users = ResourceService::<User>::new(HyperClient::new());
//!
//! let page = users.find_all().only(["id", "name"]).limit(20).list().await?;
//! users.find_where("id", [1, 2, 3]).remove().await?;
//! ```

extern crate self as rivet;

mod client;
mod config;
mod connector;
pub mod middleware;
mod options;
pub mod prelude;
mod query;
mod search;
mod service;

pub use client::{BoxedService, HyperClient, HyperClientBuilder, ServiceFuture};
pub use config::{ApiConfig, ClientConfig, ClientConfigBuilder};
pub use options::RequestOptions;
pub use query::{GetQuery, GetResult};
pub use search::{SearchOutcome, SearchQuery, SearchVerb};
pub use service::ResourceService;

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use rivet_core::{
    Direction, Error, FilterValue, Filters, Form, HeaderValue, Headers, HttpClient, Identified,
    IntoFilterValue, ListMeta, ListResponse, Merge, Method, Model, NO_CACHE_HEADER, Operation, Part,
    QueryParams, Request, RequestBuilder, Response, Result, StatusCode, TransportKind,
    decode_field, decode_json, generate_index, into_index, materialize, materialize_list,
    merge_response,
};

// Re-export macros
pub use rivet_macro::{Identified, Model};

/// Paths used by the derive expansions.
#[doc(hidden)]
pub mod __private {
    pub use serde_json::{Map, Value};
}
