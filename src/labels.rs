//! Label sets used to pick one metric out of a family
//!
//! A [`LabelSet`] is an unordered name/value mapping. It is stored with
//! sorted keys, so two sets holding the same pairs compare equal no matter
//! the order they were built in.

use prometheus::proto::LabelPair;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;

/// Unordered set of label name/value pairs
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelSet(BTreeMap<String, String>);

impl LabelSet {
    /// Create an empty label set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a label set from the label pairs of a collected metric
    pub fn from_label_pairs(pairs: &[LabelPair]) -> Self {
        pairs
            .iter()
            .map(|pair| (pair.get_name(), pair.get_value()))
            .collect()
    }

    /// Insert a pair, returning the previous value for `name` if any
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(name.into(), value.into())
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over pairs in label-name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether `pairs` holds exactly this set of labels
    ///
    /// Sizes are compared first, then every collected pair must be present
    /// here with an equal value. Prometheus never emits a label name twice
    /// for one metric, so this is set equality.
    pub fn matches(&self, pairs: &[LabelPair]) -> bool {
        pairs.len() == self.0.len()
            && pairs
                .iter()
                .all(|pair| self.get(pair.get_name()) == Some(pair.get_value()))
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value:?}")?;
        }
        f.write_str("}")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LabelSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for LabelSet {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<String>> From<Vec<(K, V)>> for LabelSet {
    fn from(pairs: Vec<(K, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl From<&[(&str, &str)]> for LabelSet {
    fn from(pairs: &[(&str, &str)]) -> Self {
        pairs.iter().copied().collect()
    }
}

impl<K: Into<String>, V: Into<String>, S: BuildHasher> From<HashMap<K, V, S>> for LabelSet {
    fn from(map: HashMap<K, V, S>) -> Self {
        map.into_iter().collect()
    }
}

impl From<BTreeMap<String, String>> for LabelSet {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl From<&LabelSet> for LabelSet {
    fn from(labels: &LabelSet) -> Self {
        labels.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(name: &str, value: &str) -> LabelPair {
        let mut pair = LabelPair::default();
        pair.set_name(name.to_string());
        pair.set_value(value.to_string());
        pair
    }

    #[test]
    fn test_equality_ignores_insertion_order() {
        let a = LabelSet::new().with("method", "GET").with("code", "200");
        let b = LabelSet::from([("code", "200"), ("method", "GET")]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_values_are_not_equal() {
        let a = LabelSet::from([("method", "GET")]);
        let b = LabelSet::from([("method", "POST")]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_matches_requires_same_size() {
        let labels = LabelSet::from([("method", "GET")]);
        assert!(!labels.matches(&[pair("method", "GET"), pair("code", "200")]));
        assert!(!LabelSet::new().matches(&[pair("method", "GET")]));
        assert!(LabelSet::new().matches(&[]));
    }

    #[test]
    fn test_matches_is_order_independent() {
        let labels = LabelSet::from([("method", "GET"), ("code", "200")]);
        assert!(labels.matches(&[pair("code", "200"), pair("method", "GET")]));
        assert!(labels.matches(&[pair("method", "GET"), pair("code", "200")]));
        assert!(!labels.matches(&[pair("method", "GET"), pair("code", "500")]));
    }

    #[test]
    fn test_from_label_pairs_round_trips_through_matches() {
        let pairs = [pair("zone", "eu"), pair("host", "a")];
        let labels = LabelSet::from_label_pairs(&pairs);
        assert_eq!(labels.get("zone"), Some("eu"));
        assert!(labels.matches(&pairs));
    }

    #[test]
    fn test_display_is_sorted_and_quoted() {
        let labels = LabelSet::from([("method", "GET"), ("code", "200")]);
        assert_eq!(labels.to_string(), r#"{code="200", method="GET"}"#);
        assert_eq!(LabelSet::new().to_string(), "{}");
    }

    #[test]
    fn test_conversions_agree() {
        let expected = LabelSet::from([("a", "1"), ("b", "2")]);

        let slice: &[(&str, &str)] = &[("b", "2"), ("a", "1")];
        assert_eq!(LabelSet::from(slice), expected);

        let mut hash = HashMap::new();
        hash.insert("a".to_string(), "1".to_string());
        hash.insert("b".to_string(), "2".to_string());
        assert_eq!(LabelSet::from(hash), expected);

        assert_eq!(LabelSet::from(vec![("a", "1"), ("b", "2")]), expected);
        assert_eq!(LabelSet::from(&expected), expected);
    }

    #[test]
    fn test_insert_replaces_value() {
        let mut labels = LabelSet::new();
        assert_eq!(labels.insert("a", "1"), None);
        assert_eq!(labels.insert("a", "2"), Some("1".to_string()));
        assert_eq!(labels.len(), 1);
        assert_eq!(labels.get("a"), Some("2"));
    }
}
