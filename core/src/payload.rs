//! Request body normalization.
//!
//! Tool callers post `{"query": "..."}` / `{"id": "..."}` objects, while the
//! legacy wrappers post the bare value as the body. Both land on the same
//! operation: the body is classified once into [`Body`], normalized to a JSON
//! map, and the `raw` slot is rebound to whatever key the operation reads.

use serde_json::{Map, Value};
use thiserror::Error;

/// Key a raw (non-object) body is stored under before rebinding.
pub const RAW_KEY: &str = "raw";

/// A request body after classification.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// A JSON object
    Structured(Map<String, Value>),
    /// Anything textual that is not a JSON object
    Raw(String),
    /// Bytes that could not be decoded as text
    Malformed(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum PayloadError {
    #[error("Request body is not valid UTF-8: {0}")]
    NotUtf8(String),
}

impl Body {
    /// Classify raw request bytes.
    ///
    /// Empty bodies count as an empty object. A JSON string body is unwrapped
    /// to its contents so `"acc_1"` and `acc_1` mean the same thing.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let text = match std::str::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => return Body::Malformed(err.to_string()),
        };
        if text.trim().is_empty() {
            return Body::Structured(Map::new());
        }
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => Body::Structured(map),
            Ok(Value::String(inner)) => Body::Raw(inner),
            _ => Body::Raw(text.to_string()),
        }
    }

    /// Map the body to a JSON object; raw text is wrapped as `{"raw": text}`.
    pub fn normalize(self) -> Result<Map<String, Value>, PayloadError> {
        match self {
            Body::Structured(map) => Ok(map),
            Body::Raw(text) => {
                let mut map = Map::new();
                map.insert(RAW_KEY.to_string(), Value::String(text));
                Ok(map)
            }
            Body::Malformed(reason) => Err(PayloadError::NotUtf8(reason)),
        }
    }

    /// Normalize and move `raw` to `key` when the caller did not set `key`.
    pub fn into_args(self, key: &str) -> Result<Map<String, Value>, PayloadError> {
        Ok(rebind_raw(self.normalize()?, key))
    }
}

/// Move the `raw` entry to `key` unless `key` is already present.
pub fn rebind_raw(mut map: Map<String, Value>, key: &str) -> Map<String, Value> {
    if !map.contains_key(key) {
        if let Some(raw) = map.remove(RAW_KEY) {
            map.insert(key.to_string(), raw);
        }
    }
    map
}

/// Read `key` as a string. Missing/null reads as empty, other scalars as
/// their JSON text.
pub fn string_arg(args: &Map<String, Value>, key: &str) -> String {
    args.get(key)
        .map(crate::accounts::scalar_to_string)
        .unwrap_or_default()
}
