//! Model contract and response materialization.
//!
//! A model is any serde record that knows its endpoint ([`Model::BASE_PATH`])
//! and its identifier ([`Identified::id`]). Responses are turned into models
//! in two ways:
//!
//! - **materialization** ([`materialize`], [`materialize_list`]) builds fresh
//!   instances from the server records, then runs
//!   [`Model::after_materialize`] once per instance;
//! - **merge** ([`merge_response`]) overlays the fields of a write response
//!   onto the value the caller already holds.
//!
//! Both derive macros in `rivet` implement these traits:
//!
//! ```ignore
//! #[derive(Debug, Serialize, Deserialize, Model)]
//! #[model(path = "/users")]
//! struct User {
//!     id: Option<u64>,
//!     name: String,
//! }
//! ```

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// A record exposing a unique identifier.
///
/// The identifier is optional because a resource has none until the server
/// assigns it on creation.
pub trait Identified {
    /// Identifier type, numeric or textual. Rendered with [`Display`] in URLs.
    type Id: Clone + Eq + Hash + Display + Send + Sync + 'static;

    /// The identifier, if known.
    fn id(&self) -> Option<Self::Id>;
}

/// A record that write responses can be merged into.
///
/// Both derives generate this impl: every key of `fields` that names a
/// deserializable field is decoded with [`decode_field`] and assigned; other
/// keys are ignored, and fields the response does not mention are left
/// alone. Either every present field is assigned or none is.
pub trait Merge {
    /// Overlay the top-level `fields` of a response object onto `self`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] naming the first field whose value does not
    /// fit, in which case `self` is unchanged.
    fn merge_fields(&mut self, fields: Map<String, Value>) -> Result<()>;
}

/// An entity type served by a REST resource endpoint.
pub trait Model: Identified + Merge + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Path of the resource collection, appended to the base URL (e.g. `/users`).
    const BASE_PATH: &'static str;

    /// Called once on every instance built from a server response,
    /// after all fields are assigned.
    fn after_materialize(&mut self) {}
}

/// Metadata of a list envelope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMeta {
    /// Total number of matching records, when the server reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

/// List envelope: `{ "data": [...], "meta": { "count": n } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    /// Records of the current page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<T>>,
    /// Envelope metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ListMeta>,
}

impl<T> Default for ListResponse<T> {
    fn default() -> Self {
        Self {
            data: None,
            meta: None,
        }
    }
}

impl<T> ListResponse<T> {
    /// Records, or an empty slice when `data` is absent.
    #[must_use]
    pub fn items(&self) -> &[T] {
        self.data.as_deref().unwrap_or_default()
    }

    /// Consume into the records.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.data.unwrap_or_default()
    }

    /// `meta.count`, when present.
    #[must_use]
    pub fn count(&self) -> Option<u64> {
        self.meta.and_then(|meta| meta.count)
    }

    /// Number of records in `data`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items().len()
    }

    /// `true` when `data` is absent or empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

impl<T> IntoIterator for ListResponse<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_items().into_iter()
    }
}

/// Decode a JSON body; a mismatch reports its JSON path (e.g. `data[3].email`).
///
/// # Errors
///
/// Returns [`Error::Decode`] when `body` is not a valid `T`.
pub fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(body);
    Ok(serde_path_to_error::deserialize(&mut deserializer)?)
}

/// Decode the value of the top-level response field `field`.
///
/// The error path is rooted at `field`, so a bad `tags` entry reports
/// `tags[1]`.
///
/// # Errors
///
/// Returns [`Error::Decode`] when `value` is not a valid `T`.
pub fn decode_field<T: DeserializeOwned>(field: &str, value: Value) -> Result<T> {
    serde_path_to_error::deserialize(value).map_err(|err| {
        let nested = err.path().to_string();
        let path = match nested.as_str() {
            "." => field.to_string(),
            index if index.starts_with('[') => format!("{field}{index}"),
            inner => format!("{field}.{inner}"),
        };
        Error::Decode {
            path,
            message: err.into_inner().to_string(),
        }
    })
}

/// Build one model instance from a response body.
///
/// # Errors
///
/// Returns a decode error if the body is not a valid `M` record.
pub fn materialize<M: Model>(body: &[u8]) -> Result<M> {
    let mut model: M = decode_json(body)?;
    model.after_materialize();
    Ok(model)
}

/// Build a list envelope from a response body, materializing every record.
///
/// # Errors
///
/// Returns a decode error if the body is not a valid envelope.
pub fn materialize_list<M: Model>(body: &[u8]) -> Result<ListResponse<M>> {
    let mut list: ListResponse<M> = decode_json(body)?;
    if let Some(data) = list.data.as_mut() {
        data.iter_mut().for_each(Model::after_materialize);
    }
    Ok(list)
}

/// Overlay the fields of a write response onto `target`.
///
/// An empty body, or a body that is not a JSON object, leaves `target`
/// untouched. Fields absent from the response keep their current value,
/// including fields serde never reads.
///
/// # Errors
///
/// Returns an error if the body is not JSON, or if a returned field does not
/// fit its target field.
pub fn merge_response<T: Merge + ?Sized>(target: &mut T, body: &[u8]) -> Result<()> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(());
    }
    match decode_json::<Value>(body)? {
        Value::Object(fields) if !fields.is_empty() => target.merge_fields(fields),
        _ => Ok(()),
    }
}

/// Index entries by identifier. Entries without identifier are skipped.
#[must_use]
pub fn generate_index<M: Identified>(entries: &[M]) -> HashMap<M::Id, &M> {
    entries
        .iter()
        .filter_map(|entry| entry.id().map(|id| (id, entry)))
        .collect()
}

/// Owning variant of [`generate_index`].
#[must_use]
pub fn into_index<M: Identified>(entries: impl IntoIterator<Item = M>) -> HashMap<M::Id, M> {
    entries
        .into_iter()
        .filter_map(|entry| entry.id().map(|id| (id, entry)))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert2::{check, let_assert};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Account {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<u64>,
        name: String,
        #[serde(default)]
        tags: Vec<String>,
        #[serde(skip)]
        hook_runs: usize,
    }

    static HOOK_CALLS: AtomicUsize = AtomicUsize::new(0);

    impl Identified for Account {
        type Id = u64;

        fn id(&self) -> Option<u64> {
            self.id
        }
    }

    impl Merge for Account {
        fn merge_fields(&mut self, mut fields: Map<String, Value>) -> Result<()> {
            let id = fields
                .remove("id")
                .map(|value| decode_field("id", value))
                .transpose()?;
            let name = fields
                .remove("name")
                .map(|value| decode_field("name", value))
                .transpose()?;
            let tags = fields
                .remove("tags")
                .map(|value| decode_field("tags", value))
                .transpose()?;

            if let Some(id) = id {
                self.id = id;
            }
            if let Some(name) = name {
                self.name = name;
            }
            if let Some(tags) = tags {
                self.tags = tags;
            }
            Ok(())
        }
    }

    impl Model for Account {
        const BASE_PATH: &'static str = "/accounts";

        fn after_materialize(&mut self) {
            self.hook_runs += 1;
            HOOK_CALLS.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn account(id: Option<u64>, name: &str) -> Account {
        Account {
            id,
            name: name.to_string(),
            tags: Vec::new(),
            hook_runs: 0,
        }
    }

    #[test]
    fn materialize_runs_hook_once() {
        let account: Account = materialize(br#"{"id":123,"name":"abc"}"#).expect("valid record");

        check!(account.id == Some(123));
        check!(account.name == "abc");
        check!(account.hook_runs == 1);
    }

    #[test]
    fn materialize_list_keeps_meta() {
        let before = HOOK_CALLS.load(Ordering::SeqCst);
        let list: ListResponse<Account> = materialize_list(
            br#"{"data":[{"id":1,"name":"a"},{"id":2,"name":"b"}],"meta":{"count":2}}"#,
        )
        .expect("valid envelope");

        check!(list.count() == Some(2));
        check!(list.len() == 2);
        check!(list.items().iter().all(|a| a.hook_runs == 1));
        check!(HOOK_CALLS.load(Ordering::SeqCst) - before >= 2);
    }

    #[test]
    fn materialize_list_without_data() {
        let list: ListResponse<Account> = materialize_list(br#"{"meta":{}}"#).expect("envelope");
        check!(list.data.is_none());
        check!(list.is_empty());
        check!(list.count().is_none());
    }

    #[test]
    fn materialize_reports_bad_record() {
        let result = materialize::<Account>(br#"{"id":"x","name":"a"}"#);
        let_assert!(Err(Error::Decode { path, .. }) = result);
        check!(path == "id");
    }

    #[test]
    fn merge_assigns_returned_fields() {
        let mut target = account(None, "draft");
        target.tags.push("new".to_string());

        merge_response(&mut target, br#"{"id":9}"#).expect("merge");

        check!(target.id == Some(9));
        check!(target.name == "draft");
        check!(target.tags == vec!["new".to_string()]);
    }

    #[test]
    fn merge_overwrites_existing_fields() {
        let mut target = account(Some(1), "old");
        merge_response(&mut target, br#"{"id":1,"name":"new","extra":true}"#).expect("merge");
        check!(target.name == "new");
    }

    #[test]
    fn merge_ignores_empty_and_non_object_bodies() {
        let original = account(Some(1), "same");

        let bodies: [&[u8]; 6] = [b"", b"  ", b"{}", b"null", b"[1,2]", b"\"ok\""];
        for body in bodies {
            let mut target = original.clone();
            merge_response(&mut target, body).expect("no-op merge");
            check!(target == original);
        }
    }

    #[test]
    fn merge_rejects_incompatible_field() {
        let mut target = account(Some(1), "same");
        let result = merge_response(&mut target, br#"{"name":42}"#);
        let_assert!(Err(Error::Decode { path, .. }) = result);
        check!(path == "name");
        check!(target.name == "same");
    }

    #[test]
    fn merge_is_all_or_nothing() {
        let mut target = account(Some(1), "same");
        let result = merge_response(&mut target, br#"{"name":"renamed","tags":["a",2]}"#);

        let_assert!(Err(Error::Decode { path, .. }) = result);
        check!(path == "tags[1]");
        check!(target.name == "same");
    }

    #[test]
    fn merge_keeps_fields_serde_never_reads() {
        let mut target: Account = materialize(br#"{"id":4,"name":"before"}"#).expect("record");
        check!(target.hook_runs == 1);

        merge_response(&mut target, br#"{"name":"after"}"#).expect("merge");

        check!(target.name == "after");
        check!(target.id == Some(4));
        check!(target.hook_runs == 1);
    }

    #[test]
    fn list_envelope_needs_no_default_records() {
        #[derive(Debug, Deserialize)]
        struct Opaque {
            #[allow(dead_code)]
            code: u8,
        }

        let list: ListResponse<Opaque> = decode_json(br#"{"data":[{"code":1}]}"#).expect("list");
        check!(list.len() == 1);
        check!(list.meta.is_none());
    }

    #[test]
    fn index_by_id() {
        let entries = vec![
            account(Some(1), "a"),
            account(None, "pending"),
            account(Some(2), "b"),
        ];

        let index = generate_index(&entries);
        check!(index.len() == 2);
        check!(index.get(&2).map(|a| a.name.as_str()) == Some("b"));

        let owned = into_index(entries);
        check!(owned.get(&1).map(|a| a.name.as_str()) == Some("a"));
    }
}
