//! Search filters: ordered `field=value` pairs.
//!
//! Values are stringified as soon as they are added. A list value is kept as
//! a list and comma-joined when the pairs are serialized, so
//! `("id", [1, 2, 3])` goes on the wire as `id=1,2,3`.

use std::fmt::Display;

/// A stringified filter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// One value.
    Single(String),
    /// Several values, matched as a batch.
    List(Vec<String>),
}

impl FilterValue {
    /// Wire form of the value: lists are comma-joined in order.
    #[must_use]
    pub fn to_query_value(&self) -> String {
        match self {
            Self::Single(value) => value.clone(),
            Self::List(values) => values.join(","),
        }
    }
}

/// Conversion into a [`FilterValue`].
///
/// Implemented for strings, numbers, booleans, and for slices, arrays and
/// vectors of displayable items.
pub trait IntoFilterValue {
    /// Stringify `self`.
    fn into_filter_value(self) -> FilterValue;
}

impl IntoFilterValue for FilterValue {
    fn into_filter_value(self) -> FilterValue {
        self
    }
}

macro_rules! scalar_filter_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoFilterValue for $ty {
                fn into_filter_value(self) -> FilterValue {
                    FilterValue::Single(self.to_string())
                }
            }
        )*
    };
}

scalar_filter_value!(
    &str, String, &String, bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128,
    usize, f32, f64,
);

impl<T: Display> IntoFilterValue for Vec<T> {
    fn into_filter_value(self) -> FilterValue {
        FilterValue::List(self.iter().map(ToString::to_string).collect())
    }
}

impl<T: Display> IntoFilterValue for &[T] {
    fn into_filter_value(self) -> FilterValue {
        FilterValue::List(self.iter().map(ToString::to_string).collect())
    }
}

impl<T: Display, const N: usize> IntoFilterValue for [T; N] {
    fn into_filter_value(self) -> FilterValue {
        FilterValue::List(self.iter().map(ToString::to_string).collect())
    }
}

/// Ordered filter pairs of a search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters(Vec<(String, FilterValue)>);

impl Filters {
    /// Filters seeded with a first pair.
    #[must_use]
    pub fn seeded(field: impl Into<String>, value: impl IntoFilterValue) -> Self {
        let mut filters = Self::default();
        filters.push(field, value);
        filters
    }

    /// Append a pair after the existing ones.
    pub fn push(&mut self, field: impl Into<String>, value: impl IntoFilterValue) {
        self.0.push((field.into(), value.into_filter_value()));
    }

    /// Pairs, in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[(String, FilterValue)] {
        &self.0
    }

    /// Number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` when no filter was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Query pairs in insertion order, list values comma-joined.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(field, value)| (field.clone(), value.to_query_value()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_are_stringified() {
        assert_eq!(42_u64.into_filter_value(), FilterValue::Single("42".into()));
        assert_eq!(true.into_filter_value(), FilterValue::Single("true".into()));
        assert_eq!("x".into_filter_value(), FilterValue::Single("x".into()));
    }

    #[test]
    fn lists_are_comma_joined_in_order() {
        let filters = Filters::seeded("id", [3, 1, 2]);
        assert_eq!(
            filters.to_pairs(),
            vec![("id".to_string(), "3,1,2".to_string())]
        );

        let names = vec!["b".to_string(), "a".to_string()];
        assert_eq!(names.as_slice().into_filter_value().to_query_value(), "b,a");
    }

    #[test]
    fn pairs_keep_insertion_order() {
        let mut filters = Filters::seeded("status", "active");
        filters.push("role", vec!["admin", "owner"]);
        filters.push("status", "archived");

        assert_eq!(filters.len(), 3);
        assert_eq!(
            filters.to_pairs(),
            vec![
                ("status".to_string(), "active".to_string()),
                ("role".to_string(), "admin,owner".to_string()),
                ("status".to_string(), "archived".to_string()),
            ]
        );
    }

    #[test]
    fn empty_list_serializes_to_empty_value() {
        let filters = Filters::seeded("id", Vec::<u64>::new());
        assert_eq!(filters.to_pairs(), vec![("id".to_string(), String::new())]);
    }
}
