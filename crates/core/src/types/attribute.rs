//! Product variation attributes.
//!
//! The SofaHub API is loose about attribute encoding. A variation's
//! `attributes` field may be a JSON object, or a string containing a
//! JSON-encoded object, and each value may be a plain string or a
//! JSON-encoded string (`"\"red\""`). [`Attributes`] accepts every form at
//! deserialization time and [`AttributeValue`] keeps the raw text, exposing a
//! single normalized form that all comparisons go through.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Maximum number of string layers unwrapped when decoding attributes.
const MAX_DECODE_DEPTH: usize = 3;

/// A single attribute value as received from the API.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeValue {
    raw: String,
}

impl AttributeValue {
    /// Wrap a raw value.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::new(s.clone()),
            Value::Null => Self::new(String::new()),
            other => Self::new(other.to_string()),
        }
    }

    /// The value exactly as it arrived.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The value with any JSON string encoding removed.
    ///
    /// `"\"red\""` normalizes to `red`; `red` stays `red`.
    #[must_use]
    pub fn normalized(&self) -> Cow<'_, str> {
        let mut current = Cow::Borrowed(self.raw.as_str());
        for _ in 0..MAX_DECODE_DEPTH {
            match serde_json::from_str::<Value>(&current) {
                Ok(Value::String(inner)) => current = Cow::Owned(inner),
                _ => break,
            }
        }
        current
    }

    /// Compare two values after normalizing both.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl From<&str> for AttributeValue {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for AttributeValue {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.normalized())
    }
}

/// Attribute map of a variation (e.g. `{color: red, size: M}`).
///
/// Keys are kept in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(BTreeMap<String, AttributeValue>);

impl Attributes {
    /// An empty attribute map.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Decode an attribute map from any of the encodings the API uses.
    ///
    /// Anything that does not decode to an object yields an empty map.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let mut current = Cow::Borrowed(value);
        for _ in 0..MAX_DECODE_DEPTH {
            match current.as_ref() {
                Value::Object(map) => {
                    return Self(
                        map.iter()
                            .map(|(k, v)| (k.clone(), AttributeValue::from_json(v)))
                            .collect(),
                    );
                }
                Value::String(encoded) => match serde_json::from_str::<Value>(encoded) {
                    Ok(decoded) => current = Cow::Owned(decoded),
                    Err(_) => break,
                },
                _ => break,
            }
        }
        Self::new()
    }

    /// Look up a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.0.get(key)
    }

    /// Return a copy with `key` set to `value`.
    #[must_use]
    pub fn with(&self, key: &str, value: AttributeValue) -> Self {
        let mut next = self.clone();
        next.0.insert(key.to_string(), value);
        next
    }

    /// Set `key` to `value`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Whether `key` is present and its value matches `value`.
    #[must_use]
    pub fn has(&self, key: &str, value: &AttributeValue) -> bool {
        self.get(key).is_some_and(|v| v.matches(value))
    }

    /// Whether every entry of `target` is present in `self` with a matching
    /// value.
    #[must_use]
    pub fn contains_all(&self, target: &Self) -> bool {
        target.iter().all(|(key, value)| self.has(key, value))
    }

    /// Iterate over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<AttributeValue>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_json(&value))
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter())
    }
}
