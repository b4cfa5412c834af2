//! Prelude module for convenient imports.
//!
//! ```ignore
//! use rivet_core::prelude::*;
//! ```

pub use crate::{
    Direction, Error, Form, HttpClient, Identified, ListResponse, Merge, Method, Model, Part,
    QueryParams, Request, Response, Result,
};
