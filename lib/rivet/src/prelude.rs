//! Prelude module for convenient imports.
//!
//! ```ignore
//! use rivet::prelude::*;
//! ```

pub use crate::{
    ApiConfig, Direction, Error, Form, GetQuery, GetResult, HttpClient, HyperClient, Identified,
    ListResponse, Model, Part, RequestOptions, ResourceService, Result, SearchOutcome,
    SearchQuery, SearchVerb, generate_index,
};
pub use serde::{Deserialize, Serialize};
