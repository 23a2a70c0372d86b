//! Nested request parameters.
//!
//! Query strings and HTML forms arrive as flat `key[sub]=value` pairs. These
//! are folded into a tree so resolvers can tell an absent section from a
//! malformed one, without reaching for ambient request state.

use std::collections::BTreeMap;

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Scalar(String),
    /// Values submitted with the `key[]` suffix.
    List(Vec<String>),
    Map(Params),
}

impl ParamValue {
    /// Returns the string if this is a scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the nested parameters if this is a map.
    pub fn as_map(&self) -> Option<&Params> {
        match self {
            ParamValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Returns true if the value carries any content.
    ///
    /// Blank strings and empty collections are not present.
    pub fn is_present(&self) -> bool {
        match self {
            ParamValue::Scalar(s) => !s.trim().is_empty(),
            ParamValue::List(items) => !items.is_empty(),
            ParamValue::Map(m) => !m.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Named(&'a str),
    Push,
}

/// A tree of request parameters keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: BTreeMap<String, ParamValue>,
}

impl Params {
    /// Creates an empty parameter tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a parameter tree from decoded `(key, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::new();
        for (key, value) in pairs {
            params.insert(key.as_ref(), value);
        }
        params
    }

    /// Inserts a value under a possibly bracketed key.
    ///
    /// A later scalar replaces an earlier one. When a key is reused with a
    /// different shape (`date=x` then `date[start]=y`) the first shape is kept.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        let (name, segments) = split_key(key);
        if name.is_empty() {
            return;
        }
        self.insert_at(name, &segments, value.into());
    }

    fn insert_at(&mut self, name: &str, rest: &[Segment<'_>], value: String) {
        match rest.first() {
            None => match self.entries.get(name) {
                Some(ParamValue::List(_)) | Some(ParamValue::Map(_)) => {}
                _ => {
                    self.entries
                        .insert(name.to_string(), ParamValue::Scalar(value));
                }
            },
            Some(Segment::Push) => {
                let slot = self
                    .entries
                    .entry(name.to_string())
                    .or_insert_with(|| ParamValue::List(Vec::new()));
                if let ParamValue::List(items) = slot {
                    items.push(value);
                }
            }
            Some(Segment::Named(sub)) => {
                let slot = self
                    .entries
                    .entry(name.to_string())
                    .or_insert_with(|| ParamValue::Map(Params::new()));
                if let ParamValue::Map(child) = slot {
                    child.insert_at(sub, &rest[1..], value);
                }
            }
        }
    }

    /// Returns the raw value for a key.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    /// Returns true if the key was submitted at all.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the scalar string for a key.
    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ParamValue::as_str)
    }

    /// Returns the trimmed scalar string for a key, skipping blank values.
    pub fn non_blank(&self, key: &str) -> Option<&str> {
        self.str(key).map(str::trim).filter(|s| !s.is_empty())
    }

    /// Returns the nested parameters for a key.
    pub fn map(&self, key: &str) -> Option<&Params> {
        self.get(key).and_then(ParamValue::as_map)
    }

    /// Returns true if the key holds a present value (see [`ParamValue::is_present`]).
    pub fn is_present(&self, key: &str) -> bool {
        self.get(key).is_some_and(ParamValue::is_present)
    }

    /// Returns true if no parameters were submitted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the top-level entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Splits `event[venue][id]` into `("event", [Named("venue"), Named("id")])`.
///
/// Keys with unbalanced brackets are treated as plain names.
fn split_key(key: &str) -> (&str, Vec<Segment<'_>>) {
    let Some(open) = key.find('[') else {
        return (key, Vec::new());
    };

    let name = &key[..open];
    let mut segments = Vec::new();
    let mut rest = &key[open..];

    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('[') else {
            return (key, Vec::new());
        };
        let Some(close) = inner.find(']') else {
            return (key, Vec::new());
        };
        let segment = &inner[..close];
        segments.push(if segment.is_empty() {
            Segment::Push
        } else {
            Segment::Named(segment)
        });
        rest = &inner[close + 1..];
    }

    (name, segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_pairs() {
        let params = Params::from_pairs([("order", "name"), ("query", "jazz")]);

        assert_eq!(params.str("order"), Some("name"));
        assert_eq!(params.str("query"), Some("jazz"));
        assert!(params.get("missing").is_none());
    }

    #[test]
    fn test_nested_pairs() {
        let params = Params::from_pairs([
            ("date[start]", "2024-01-01"),
            ("date[end]", "2024-02-01"),
            ("event[title]", "Meetup"),
        ]);

        let date = params.map("date").unwrap();
        assert_eq!(date.str("start"), Some("2024-01-01"));
        assert_eq!(date.str("end"), Some("2024-02-01"));
        assert_eq!(params.map("event").unwrap().str("title"), Some("Meetup"));
    }

    #[test]
    fn test_deeply_nested_pairs() {
        let params = Params::from_pairs([("a[b][c]", "1")]);

        let c = params.map("a").and_then(|a| a.map("b")).and_then(|b| b.str("c"));
        assert_eq!(c, Some("1"));
    }

    #[test]
    fn test_list_pairs() {
        let params = Params::from_pairs([("tags[]", "music"), ("tags[]", "free")]);

        assert_eq!(
            params.get("tags"),
            Some(&ParamValue::List(vec!["music".to_string(), "free".to_string()]))
        );
    }

    #[test]
    fn test_scalar_keeps_shape_over_later_map() {
        let params = Params::from_pairs([("date", "yesterday"), ("date[start]", "2024-01-01")]);

        assert_eq!(params.str("date"), Some("yesterday"));
        assert!(params.map("date").is_none());
    }

    #[test]
    fn test_later_scalar_wins() {
        let params = Params::from_pairs([("order", "name"), ("order", "venue")]);
        assert_eq!(params.str("order"), Some("venue"));
    }

    #[test]
    fn test_unbalanced_brackets_are_plain_names() {
        let params = Params::from_pairs([("date[start", "2024-01-01")]);
        assert_eq!(params.str("date[start"), Some("2024-01-01"));
    }

    #[test]
    fn test_non_blank() {
        let params = Params::from_pairs([("a", "  "), ("b", " x ")]);

        assert_eq!(params.non_blank("a"), None);
        assert_eq!(params.non_blank("b"), Some("x"));
        assert_eq!(params.non_blank("c"), None);
    }

    #[test]
    fn test_is_present() {
        let params = Params::from_pairs([("blank", ""), ("value", "1"), ("map[k]", "")]);

        assert!(!params.is_present("blank"));
        assert!(params.is_present("value"));
        assert!(params.is_present("map"));
        assert!(!params.is_present("missing"));
    }
}
