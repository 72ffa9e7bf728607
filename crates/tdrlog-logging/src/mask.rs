//! Sensitive data masking for request/response payloads
//!
//! Payloads reach the logger in several shapes: raw body bytes, body text,
//! an already-decoded JSON object, or some other value. [`Payload`] names
//! those shapes so masking can dispatch on them explicitly.
//!
//! Masking walks every object entry:
//! - an object value is walked recursively;
//! - an array value has each of its object elements walked, other
//!   elements are left alone;
//! - any other value is replaced by [`MASK`] when its key is sensitive.
//!
//! Bodies that are not a JSON object (malformed text, top-level arrays)
//! pass through untouched. Masking never fails.

use serde_json::{Map, Value};
use tdrlog_core_types::{MaskingPolicy, MASK};

/// A request or response body in whatever shape the caller has it
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    RawBytes(Vec<u8>),
    RawText(String),
    Mapping(Map<String, Value>),
    Other(Value),
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::RawBytes(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Payload::RawBytes(bytes.to_vec())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::RawText(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::RawText(text.to_string())
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(map: Map<String, Value>) -> Self {
        Payload::Mapping(map)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Payload::Mapping(map),
            Value::String(text) => Payload::RawText(text),
            other => Payload::Other(other),
        }
    }
}

/// Mask a payload according to `policy`
///
/// Raw bytes and text are decoded when they hold a JSON object and come
/// back as [`Payload::Mapping`]; otherwise they are returned unchanged.
pub fn mask(payload: Option<Payload>, policy: &MaskingPolicy) -> Option<Payload> {
    payload.map(|p| mask_payload(p, policy))
}

fn mask_payload(payload: Payload, policy: &MaskingPolicy) -> Payload {
    match payload {
        Payload::RawBytes(bytes) => match parse_object(&bytes) {
            Some(map) => Payload::Mapping(mask_map(map, policy)),
            None => Payload::RawBytes(bytes),
        },
        Payload::RawText(text) | Payload::Other(Value::String(text)) => {
            match parse_object(text.as_bytes()) {
                Some(map) => Payload::Mapping(mask_map(map, policy)),
                None => Payload::RawText(text),
            }
        }
        Payload::Mapping(map) => Payload::Mapping(mask_map(map, policy)),
        other @ Payload::Other(_) => other,
    }
}

/// Mask an object, reusing its allocation
pub fn mask_map(mut map: Map<String, Value>, policy: &MaskingPolicy) -> Map<String, Value> {
    mask_object(&mut map, policy);
    map
}

fn mask_object(map: &mut Map<String, Value>, policy: &MaskingPolicy) {
    for (key, value) in map.iter_mut() {
        match value {
            Value::Object(inner) => mask_object(inner, policy),
            Value::Array(items) => {
                for item in items.iter_mut() {
                    if let Value::Object(inner) = item {
                        mask_object(inner, policy);
                    }
                }
            }
            _ if policy.is_sensitive_key(key) => *value = Value::String(MASK.to_string()),
            _ => {}
        }
    }
}

fn parse_object(bytes: &[u8]) -> Option<Map<String, Value>> {
    if bytes.is_empty() {
        return None;
    }
    serde_json::from_slice(bytes).ok()
}

/// Render a payload as a field value
///
/// Text and bytes holding a JSON object become that object; anything else
/// stays a string. An absent payload is `null`.
pub fn normalize(payload: Option<Payload>) -> Value {
    match payload {
        None => Value::Null,
        Some(Payload::RawBytes(bytes)) => match parse_object(&bytes) {
            Some(map) => Value::Object(map),
            None => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
        },
        Some(Payload::RawText(text)) => unwrap_json_text(text),
        Some(Payload::Mapping(map)) => Value::Object(map),
        Some(Payload::Other(Value::String(text))) => unwrap_json_text(text),
        Some(Payload::Other(value)) => value,
    }
}

/// Expand text that holds a JSON object, keep any other text as a string
pub fn unwrap_json_text(text: String) -> Value {
    match parse_object(text.as_bytes()) {
        Some(map) => Value::Object(map),
        None => Value::String(text),
    }
}
