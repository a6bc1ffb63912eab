//! Canonical JSON Serialization
//!
//! Deterministic JSON used for persisted action metadata and for the
//! arbitrary-data signing envelope, so every validator hashes and verifies
//! the same byte sequence.
//!
//! # Canonical Format
//!
//! 1. **Key Ordering**: Object keys sorted lexicographically (UTF-8 byte order)
//! 2. **No Whitespace**: Compact representation, no spaces or newlines
//! 3. **No Null Values**: Fields with null values are omitted
//!
//! ```text
//! {"signer":"lumera1...","data":"aGk="}  ->  {"data":"aGk=","signer":"lumera1..."}
//! ```

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::Result;

/// Serialize value to canonical JSON string
pub fn to_canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let json_value = serde_json::to_value(value)?;
    let canonical = canonicalize_value(json_value);
    Ok(serde_json::to_string(&canonical)?)
}

/// Canonical JSON as bytes
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    to_canonical_json(value).map(String::into_bytes)
}

/// Blake3 hash of the canonical JSON representation
pub fn canonical_hash<T: Serialize>(value: &T) -> Result<[u8; 32]> {
    let canonical_json = to_canonical_json(value)?;
    Ok(*blake3::hash(canonical_json.as_bytes()).as_bytes())
}

/// Canonicalize a JSON value recursively
pub fn canonicalize_value(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted: BTreeMap<String, Value> = BTreeMap::new();
            for (k, v) in map {
                if !v.is_null() {
                    sorted.insert(k, canonicalize_value(v));
                }
            }

            // Map preserves insertion order only with `preserve_order`; either way it is sorted now
            let mut canonical_map = Map::new();
            for (k, v) in sorted {
                canonical_map.insert(k, v);
            }
            Value::Object(canonical_map)
        }
        Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize_value).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct TestMessage {
        sender: String,
        nonce: u64,
        memo: Option<String>,
        data: Vec<u8>,
    }

    #[test]
    fn test_key_ordering_and_nulls() {
        let msg = TestMessage {
            sender: "alice".to_string(),
            nonce: 42,
            memo: None,
            data: vec![1, 2, 3],
        };

        let json = to_canonical_json(&msg).unwrap();
        assert_eq!(json, r#"{"data":[1,2,3],"nonce":42,"sender":"alice"}"#);
    }

    #[test]
    fn test_nested_objects_sorted() {
        let value = serde_json::json!({
            "z": {"b": 1, "a": [{"y": 2, "x": 1}]},
            "a": "first"
        });
        let json = to_canonical_json(&value).unwrap();
        assert_eq!(json, r#"{"a":"first","z":{"a":[{"x":1,"y":2}],"b":1}}"#);
    }

    #[test]
    fn test_deterministic_hash() {
        let a = serde_json::json!({"k1": "v1", "k2": "v2"});
        let b = serde_json::json!({"k2": "v2", "k1": "v1"});
        assert_eq!(canonical_hash(&a).unwrap(), canonical_hash(&b).unwrap());
    }
}
