//! Structured key/value fields attached to a record

use serde::Serialize;
use serde_json::Value;

/// One structured field
///
/// Keys are not deduplicated: a record keeps every field it was given,
/// in the order it was given, and the encoder writes them all.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: String,
    pub value: Value,
}

impl Field {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, Value::String(value.into()))
    }

    pub fn u64(key: impl Into<String>, value: u64) -> Self {
        Self::new(key, value)
    }

    pub fn i64(key: impl Into<String>, value: i64) -> Self {
        Self::new(key, value)
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, value)
    }

    /// Field from any serializable value
    ///
    /// A value that fails to serialize is kept as its error text so the
    /// log call itself never fails.
    pub fn any<T: Serialize>(key: impl Into<String>, value: &T) -> Self {
        let value = serde_json::to_value(value)
            .unwrap_or_else(|e| Value::String(format!("<unserializable: {e}>")));
        Self::new(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_typed_constructors() {
        assert_eq!(Field::string("k", "v").value, Value::from("v"));
        assert_eq!(Field::u64("n", 7).value, Value::from(7u64));
        assert_eq!(Field::i64("n", -7).value, Value::from(-7i64));
        assert_eq!(Field::bool("b", true).value, Value::Bool(true));
    }

    #[test]
    fn test_any_serializes_structs() {
        #[derive(Serialize)]
        struct User {
            id: u32,
            name: &'static str,
        }

        let field = Field::any("user", &User { id: 1, name: "john" });
        assert_eq!(field.value["id"], 1);
        assert_eq!(field.value["name"], "john");
    }

    #[test]
    fn test_any_degrades_on_unserializable_value() {
        // Non-string map keys cannot become JSON object keys
        let mut map = BTreeMap::new();
        map.insert((1, 2), "x");

        let field = Field::any("bad", &map);
        assert!(field
            .value
            .as_str()
            .is_some_and(|s| s.starts_with("<unserializable")));
    }
}
