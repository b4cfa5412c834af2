//! `#[derive(Model)]` and `#[derive(Identified)]`.

#![allow(missing_docs)]

use std::collections::HashMap;

use rivet::prelude::*;
use rivet::{into_index, materialize, materialize_list, merge_response};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Model)]
#[model(path = "/countries", id = "code")]
struct Country {
    code: String,
    name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Model)]
#[model(path = "/orders", after_materialize = "compute_total")]
struct Order {
    id: Option<u64>,
    lines: Vec<u32>,
    #[serde(skip)]
    total: u32,
}

impl Order {
    fn compute_total(&mut self) {
        self.total += self.lines.iter().sum::<u32>();
    }
}

#[derive(Debug, Serialize, Deserialize, Model)]
#[model(path = "/sessions")]
struct Session {
    #[model(id)]
    token: String,
    id: u32,
}

#[derive(Debug, Serialize, Deserialize, Identified)]
struct OrderPatch {
    id: u64,
    lines: Option<Vec<u32>>,
}

#[derive(Debug, Serialize, Deserialize, Model)]
#[model(path = "/profiles")]
#[serde(rename_all = "camelCase")]
struct Profile {
    id: Option<u64>,
    display_name: String,
    #[serde(rename = "mail")]
    email: String,
}

#[test]
fn named_id_option_selects_field() {
    let country = Country {
        code: "FR".into(),
        name: "France".into(),
    };

    assert_eq!(Country::BASE_PATH, "/countries");
    assert_eq!(country.id(), Some("FR".to_string()));
}

#[test]
fn optional_id_is_unwrapped() {
    let mut order = Order {
        id: None,
        lines: vec![],
        total: 0,
    };
    assert_eq!(order.id(), None);

    order.id = Some(3);
    assert_eq!(order.id(), Some(3_u64));
}

#[test]
fn marked_field_wins_over_id() {
    let session = Session {
        token: "t-1".into(),
        id: 9,
    };
    assert_eq!(session.id(), Some("t-1".to_string()));
}

#[test]
fn identified_derive_for_partials() {
    let patch = OrderPatch {
        id: 12,
        lines: None,
    };
    assert_eq!(patch.id(), Some(12));
}

#[test]
fn hook_runs_once_per_materialized_record() {
    let order: Order = materialize(br#"{ "id": 1, "lines": [2, 3] }"#).expect("order");
    assert_eq!(order.total, 5);

    let list = materialize_list::<Order>(
        br#"{ "data": [{ "id": 1, "lines": [1] }, { "id": 2, "lines": [4, 4] }], "meta": { "count": 2 } }"#,
    )
    .expect("list");
    let totals: Vec<u32> = list.items().iter().map(|order| order.total).collect();
    assert_eq!(totals, [1, 8]);
    assert_eq!(list.count(), Some(2));
}

#[test]
fn index_by_derived_identifier() {
    let countries = vec![
        Country {
            code: "FR".into(),
            name: "France".into(),
        },
        Country {
            code: "JP".into(),
            name: "Japan".into(),
        },
    ];

    let index = generate_index(&countries);
    assert_eq!(index.len(), 2);
    assert_eq!(index.get("JP").map(|c| c.name.as_str()), Some("Japan"));

    let owned: HashMap<String, Country> = into_index(countries);
    assert!(owned.contains_key("FR"));
}

#[test]
fn index_skips_records_without_identifier() {
    let orders = vec![
        Order {
            id: Some(1),
            lines: vec![],
            total: 0,
        },
        Order {
            id: None,
            lines: vec![],
            total: 0,
        },
    ];

    let index = generate_index(&orders);
    assert_eq!(index.len(), 1);
    assert!(index.contains_key(&1));
}

#[test]
fn derived_merge_keeps_skipped_fields() {
    let mut order: Order = materialize(br#"{ "id": 1, "lines": [2, 3] }"#).expect("order");

    merge_response(&mut order, br#"{ "lines": [9], "unknown": true }"#).expect("merge");

    assert_eq!(order.lines, [9]);
    assert_eq!(order.total, 5);
}

#[test]
fn derived_merge_reads_serde_names() {
    let mut profile = Profile {
        id: Some(1),
        display_name: "ada".into(),
        email: "ada@old.test".into(),
    };

    merge_response(
        &mut profile,
        br#"{ "displayName": "Ada", "mail": "ada@new.test", "display_name": "ignored" }"#,
    )
    .expect("merge");

    assert_eq!(profile.display_name, "Ada");
    assert_eq!(profile.email, "ada@new.test");
}

#[test]
fn derived_merge_on_partials() {
    let mut patch = OrderPatch {
        id: 4,
        lines: None,
    };

    merge_response(&mut patch, br#"{ "id": 4, "lines": [1, 1] }"#).expect("merge");

    assert_eq!(patch.lines, Some(vec![1, 1]));
}
