//! Ordered string multimap for query parameters and form bodies
//!
//! Keys iterate in sorted order, values within a key in insertion order,
//! so encoding the same logical map is byte-identical regardless of how
//! it was populated.

use std::collections::BTreeMap;

use url::form_urlencoded;

/// A string multimap with sorted keys.
///
/// Used both for request query parameters and as the payload of a
/// form-urlencoded body.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Values {
    inner: BTreeMap<String, Vec<String>>,
}

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `k=v&k2=v2` query string, percent-decoding keys and values.
    pub fn parse(query: &str) -> Self {
        let mut values = Values::new();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            values.add(key, value);
        }
        values
    }

    /// Replace the entry for `key` with the single `value`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(key.into(), vec![value.into()]);
    }

    /// Append `value` to the entry for `key`.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.entry(key.into()).or_default().push(value.into());
    }

    /// Replace the whole value list for `key`.
    pub fn set_all(&mut self, key: impl Into<String>, values: Vec<String>) {
        self.inner.insert(key.into(), values);
    }

    pub fn remove(&mut self, key: &str) {
        self.inner.remove(key);
    }

    /// First value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values for `key`, in insertion order.
    pub fn get_all(&self, key: &str) -> Option<&[String]> {
        self.inner.get(key).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Iterate entries in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.inner
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Encode as `application/x-www-form-urlencoded`: sorted keys,
    /// percent-escaped keys and values, `&`-joined pairs.
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, values) in &self.inner {
            for value in values {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Values {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Values::new();
        for (key, value) in iter {
            values.add(key, value);
        }
        values
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn encode_is_stable_under_insertion_order(
            mut pairs in proptest::collection::vec(("[a-z]{1,8}", "[a-zA-Z0-9 @/+.-]{0,12}"), 1..8)
        ) {
            let forward: Values = pairs.iter().cloned().collect();
            pairs.reverse();
            let backward: Values = pairs.into_iter().collect();
            prop_assert_eq!(forward.encode(), backward.encode());
        }

        #[test]
        fn parse_round_trips_encode(
            pairs in proptest::collection::vec(("[a-z]{1,8}", "[a-zA-Z0-9 ]{0,12}"), 0..8)
        ) {
            let values: Values = pairs.into_iter().collect();
            prop_assert_eq!(Values::parse(&values.encode()), values);
        }
    }
}
