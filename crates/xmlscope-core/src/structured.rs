//! Tagged-value tree for `key_findings` / `structured_data` payloads.
//!
//! Handlers return arbitrary-depth maps whose leaves are strings, numbers,
//! booleans, or lists thereof. Rather than requiring a closed schema per
//! handler, `StructuredValue` represents that shape directly and is handed
//! through to consumers as opaque payload.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// A tagged value in an arbitrary-depth analysis payload.
///
/// `Map` preserves insertion order (a `Vec` of pairs, not a `HashMap`) so
/// that iterating a `StructuredValue::Map` always reproduces source order,
/// matching the determinism requirement the chunking engine depends on.
///
/// `Map` serializes as a JSON object (key order preserved) rather than as
/// an array of pairs; this is why `Serialize` is implemented by hand below
/// instead of derived.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StructuredValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<StructuredValue>),
    #[serde(with = "map_as_pairs")]
    Map(Vec<(String, StructuredValue)>),
}

impl Serialize for StructuredValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            StructuredValue::Null => serializer.serialize_unit(),
            StructuredValue::Bool(b) => serializer.serialize_bool(*b),
            StructuredValue::Number(n) => serializer.serialize_f64(*n),
            StructuredValue::String(s) => serializer.serialize_str(s),
            StructuredValue::List(items) => items.serialize(serializer),
            StructuredValue::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

/// Deserialization helper: a JSON object deserializes into an ordered
/// `Vec<(String, StructuredValue)>`, matching how `Serialize` emits it.
mod map_as_pairs {
    use super::StructuredValue;
    use serde::de::{Deserialize, Deserializer};
    use std::collections::BTreeMap;

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<(String, StructuredValue)>, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Plain JSON object deserialization does not preserve key order
        // without a feature flag on the caller's serde_json; BTreeMap gives
        // a deterministic (sorted) order as a safe fallback for the
        // Deserialize direction, which this crate only uses in tests.
        let map = BTreeMap::<String, StructuredValue>::deserialize(deserializer)?;
        Ok(map.into_iter().collect())
    }
}

impl StructuredValue {
    /// Build an empty ordered map.
    pub fn map() -> Self {
        StructuredValue::Map(Vec::new())
    }

    /// Insert a key/value pair into a `Map` variant, appending if the key
    /// is new and overwriting in place if it already exists.
    ///
    /// No-op (silently) if called on a non-`Map` variant; callers that
    /// build payloads incrementally always start from `StructuredValue::map()`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<StructuredValue>) {
        if let StructuredValue::Map(entries) = self {
            let key = key.into();
            let value = value.into();
            if let Some(existing) = entries.iter_mut().find(|(k, _)| *k == key) {
                existing.1 = value;
            } else {
                entries.push((key, value));
            }
        }
    }

    /// Look up a key in a `Map` variant.
    pub fn get(&self, key: &str) -> Option<&StructuredValue> {
        match self {
            StructuredValue::Map(entries) => {
                entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
            }
            _ => None,
        }
    }

    /// Is this an empty map or list?
    pub fn is_empty(&self) -> bool {
        match self {
            StructuredValue::Map(entries) => entries.is_empty(),
            StructuredValue::List(items) => items.is_empty(),
            StructuredValue::Null => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StructuredValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<String> for StructuredValue {
    fn from(value: String) -> Self {
        StructuredValue::String(value)
    }
}

impl From<&str> for StructuredValue {
    fn from(value: &str) -> Self {
        StructuredValue::String(value.to_string())
    }
}

impl From<bool> for StructuredValue {
    fn from(value: bool) -> Self {
        StructuredValue::Bool(value)
    }
}

impl From<f64> for StructuredValue {
    fn from(value: f64) -> Self {
        StructuredValue::Number(value)
    }
}

impl From<usize> for StructuredValue {
    fn from(value: usize) -> Self {
        StructuredValue::Number(value as f64)
    }
}

impl From<Vec<StructuredValue>> for StructuredValue {
    fn from(value: Vec<StructuredValue>) -> Self {
        StructuredValue::List(value)
    }
}

impl Default for StructuredValue {
    fn default() -> Self {
        StructuredValue::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_insert_preserves_order() {
        let mut m = StructuredValue::map();
        m.insert("b", "second");
        m.insert("a", "first");
        let StructuredValue::Map(entries) = &m else {
            unreachable!()
        };
        assert_eq!(entries[0].0, "b");
        assert_eq!(entries[1].0, "a");
    }

    #[test]
    fn map_insert_overwrites_existing_key() {
        let mut m = StructuredValue::map();
        m.insert("key", "first");
        m.insert("key", "second");
        assert_eq!(m.get("key").and_then(StructuredValue::as_str), Some("second"));
        let StructuredValue::Map(entries) = &m else {
            unreachable!()
        };
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn serializes_as_plain_json_shapes() {
        let mut m = StructuredValue::map();
        m.insert("count", 3usize);
        m.insert("ok", true);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, r#"{"count":3.0,"ok":true}"#);
    }
}
