//! Header redaction for transaction detail records
//!
//! Two header collections are understood: an [`http::HeaderMap`] and a raw
//! wire-form header block ([`RawHeaders`]). Anything else is passed through
//! as given.

use std::fmt;

use http::HeaderMap;
use serde_json::{Map, Value};
use tdrlog_core_types::MaskingPolicy;

/// Header block in wire form: an optional start line, then `Name: value` lines
///
/// Lookups and deletions compare names case-insensitively; names keep the
/// spelling they arrived with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawHeaders {
    start_line: Option<String>,
    entries: Vec<(String, String)>,
}

impl RawHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a header block; lines without a `:` separator are dropped
    pub fn parse(text: &str) -> Self {
        let mut headers = Self::new();
        for (i, line) in text.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            if i == 0 && line.contains(" HTTP/") {
                headers.start_line = Some(line.to_string());
                continue;
            }
            if let Some((name, value)) = line.split_once(':') {
                headers.add(name.trim(), value.trim());
            }
        }
        headers
    }

    /// Append a header, keeping any existing values of the same name
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// First value of a header
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Remove every value of a header
    pub fn del(&mut self, name: &str) {
        self.entries.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize back to wire form, terminated by an empty line
    pub fn to_wire(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RawHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(start) = &self.start_line {
            write!(f, "{start}\r\n")?;
        }
        for (name, value) in &self.entries {
            write!(f, "{name}: {value}\r\n")?;
        }
        f.write_str("\r\n")
    }
}

/// Headers attached to a transaction detail record
#[derive(Debug, Clone)]
pub enum Headers {
    Http(HeaderMap),
    Raw(RawHeaders),
    Other(Value),
}

impl From<HeaderMap> for Headers {
    fn from(map: HeaderMap) -> Self {
        Headers::Http(map)
    }
}

impl From<RawHeaders> for Headers {
    fn from(raw: RawHeaders) -> Self {
        Headers::Raw(raw)
    }
}

impl From<Value> for Headers {
    fn from(value: Value) -> Self {
        Headers::Other(value)
    }
}

impl Headers {
    /// Render as a field value
    ///
    /// A `HeaderMap` becomes `{name: [values]}`, raw headers their wire
    /// text. Header values that are not valid UTF-8 are rendered lossily.
    pub fn into_value(self) -> Value {
        match self {
            Headers::Http(map) => {
                let mut out = Map::new();
                for name in map.keys() {
                    let values = map
                        .get_all(name)
                        .iter()
                        .map(|v| Value::String(String::from_utf8_lossy(v.as_bytes()).into_owned()))
                        .collect();
                    out.insert(name.as_str().to_string(), Value::Array(values));
                }
                Value::Object(out)
            }
            Headers::Raw(raw) => Value::String(raw.to_wire()),
            Headers::Other(value) => value,
        }
    }
}

/// Delete every sensitive header name from a recognised collection
pub fn strip_sensitive_headers(headers: Headers, policy: &MaskingPolicy) -> Headers {
    match headers {
        Headers::Http(mut map) => {
            for name in policy.headers() {
                map.remove(name.as_str());
            }
            Headers::Http(map)
        }
        Headers::Raw(mut raw) => {
            for name in policy.headers() {
                raw.del(name);
            }
            Headers::Raw(raw)
        }
        other @ Headers::Other(_) => other,
    }
}
