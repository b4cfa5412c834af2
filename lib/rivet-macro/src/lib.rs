//! Derive macros for rivet resource models.
//!
//! - `#[derive(Model)]` - implements `rivet::Identified`, `rivet::Merge` and
//!   `rivet::Model`
//! - `#[derive(Identified)]` - implements `rivet::Identified` and
//!   `rivet::Merge`, for partial records sent with `patch`
//!
//! The generated `Merge` assigns fields one by one from a write response,
//! reading the keys serde would read (`rename`, `rename_all`). Fields marked
//! `skip`, `skip_deserializing` or `flatten`, or decoded `with` a custom
//! function, keep their value.
//!
//! # Example
//!
//! ```ignore
//! use rivet::prelude::*;
//!
//! #[derive(Debug, Serialize, Deserialize, Model)]
//! #[model(path = "/users", after_materialize = "normalize")]
//! pub struct User {
//!     id: Option<u64>,
//!     email: String,
//! }
//!
//! impl User {
//!     fn normalize(&mut self) {
//!         self.email = self.email.to_lowercase();
//!     }
//! }
//! ```

mod attrs;
mod model_derive;

use proc_macro::TokenStream;

/// Derive `Identified`, `Merge` and `Model` for a struct.
///
/// # Struct Attributes
///
/// - `#[model(path = "/users")]` (required) - collection path appended to the base URL
/// - `#[model(id = "field")]` - identifier field when it is not called `id`
/// - `#[model(after_materialize = "method")]` - `fn(&mut self)` run on every
///   instance built from a server response
///
/// # Field Attributes
///
/// - `#[model(id)]` - marks the identifier field
///
/// An `Option<T>` identifier field gives `Id = T`; any other type `T` is
/// always reported as present.
#[proc_macro_derive(Model, attributes(model))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    model_derive::expand_model(input.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive `Identified` and `Merge` for a struct.
///
/// Accepts the same `id` options as [`macro@Model`]; `path` and
/// `after_materialize` are ignored.
///
/// # Example
///
/// ```ignore
/// #[derive(Serialize, Deserialize, Identified)]
/// struct RenameUser {
///     id: u64,
///     name: String,
/// }
///
/// users.patch(&mut RenameUser { id: 7, name: "Ada".into() }).await?;
/// ```
#[proc_macro_derive(Identified, attributes(model))]
pub fn derive_identified(input: TokenStream) -> TokenStream {
    model_derive::expand_identified(input.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
