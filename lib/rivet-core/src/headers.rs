//! Request header map with single or repeated values.

use std::collections::HashMap;

/// A header value: one string or a list of strings.
///
/// A list is sent as repeated header lines with the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    /// A single value.
    Single(String),
    /// Several values for the same header name.
    Multiple(Vec<String>),
}

impl HeaderValue {
    /// Iterate over every value.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::Multiple(values) => values,
        };
        slice.iter().map(String::as_str)
    }

    /// The first value, if any.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.values().next()
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for HeaderValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multiple(values)
    }
}

impl From<Vec<&str>> for HeaderValue {
    fn from(values: Vec<&str>) -> Self {
        Self::Multiple(values.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for HeaderValue {
    fn from(values: [&str; N]) -> Self {
        Self::Multiple(values.iter().map(|v| (*v).to_string()).collect())
    }
}

/// Header name to value mapping.
///
/// Setting a name that is already present overwrites it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(HashMap<String, HeaderValue>);

impl Headers {
    /// Empty header map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or overwrite) a header.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<HeaderValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Header value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.0.get(name)
    }

    /// Remove a header, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<HeaderValue> {
        self.0.remove(name)
    }

    /// `true` when no header is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct header names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over `(name, value)` entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Copy every entry of `other` into `self`, overwriting duplicates.
    pub fn extend(&mut self, other: &Self) {
        for (name, value) in other.iter() {
            self.0.insert(name.to_string(), value.clone());
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<HeaderValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_overwrites() {
        let mut headers = Headers::new();
        headers.insert("X-Trace", "a");
        headers.insert("X-Trace", "b");

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("X-Trace"), Some(&HeaderValue::from("b")));
    }

    #[test]
    fn multiple_values_iterate_in_order() {
        let value = HeaderValue::from(["gzip", "br"]);
        assert_eq!(value.values().collect::<Vec<_>>(), vec!["gzip", "br"]);
        assert_eq!(value.first(), Some("gzip"));
    }

    #[test]
    fn collect_from_pairs() {
        let headers: Headers = [("Accept", "application/json")].into_iter().collect();
        assert_eq!(
            headers.get("Accept").and_then(HeaderValue::first),
            Some("application/json")
        );
    }
}
