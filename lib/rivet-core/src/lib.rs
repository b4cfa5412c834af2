//! Core types and traits for the rivet REST resource client.
//!
//! This crate holds everything that does not touch the network:
//! - [`Method`], [`Request`], [`RequestBuilder`], [`Response`] - HTTP messages
//! - [`Error`] and [`Result`] - Error handling
//! - [`HttpClient`] - Transport trait the resource services execute requests with
//! - [`Identified`], [`Merge`], [`Model`], [`ListResponse`] - The model contract and list envelope
//! - [`materialize`], [`materialize_list`], [`merge_response`] - Response materialization
//! - [`QueryParams`], [`Direction`] - Read-query state (selection, pagination, ordering)
//! - [`Filters`], [`FilterValue`] - Search filter pairs
//! - [`Form`], [`Part`] - Multipart bodies for uploads

mod client;
mod error;
mod filter;
mod headers;
mod method;
mod model;
mod multipart;
pub mod prelude;
mod query;
mod request;
mod response;

pub use client::HttpClient;
pub use error::{Error, Result, TransportKind};
pub use filter::{FilterValue, Filters, IntoFilterValue};
pub use headers::{HeaderValue, Headers};
pub use method::Method;
pub use model::{
    Identified, ListMeta, ListResponse, Merge, Model, decode_field, decode_json, generate_index,
    into_index, materialize, materialize_list, merge_response,
};
pub use multipart::{Form, Part};
pub use query::{Direction, NO_CACHE_HEADER, QueryParams};
pub use request::{Operation, Request, RequestBuilder};
pub use response::Response;

// Re-export http crate types for status codes
pub use http::StatusCode;
