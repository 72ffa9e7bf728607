//! Masking policy: which keys and headers never reach a sink in clear
//!
//! The default policy is fixed at build time. Callers that need a
//! different set can build their own with [`MaskingPolicy::new`]; the
//! masking algorithm does not change.

use std::collections::HashSet;

/// Replacement written in place of a sensitive value
pub const MASK: &str = "*****";

/// Body keys whose values are masked (compared case-insensitively)
pub const SENSITIVE_KEYS: &[&str] = &[
    "password",
    "license",
    "license_code",
    "token",
    "access_token",
    "refresh_token",
];

/// Header names stripped from transaction records
pub const SENSITIVE_HEADERS: &[&str] = &["Authorization", "Signature", "Apikey"];

/// Sensitive key and header sets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskingPolicy {
    keys: HashSet<String>,
    headers: Vec<String>,
}

impl MaskingPolicy {
    /// Build a policy from explicit key and header names
    pub fn new<K, H>(keys: K, headers: H) -> Self
    where
        K: IntoIterator,
        K::Item: AsRef<str>,
        H: IntoIterator,
        H::Item: Into<String>,
    {
        Self {
            keys: keys
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .collect(),
            headers: headers.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a body key must be masked
    pub fn is_sensitive_key(&self, key: &str) -> bool {
        self.keys.contains(&key.to_lowercase())
    }

    /// Header names to strip, in configured spelling
    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl Default for MaskingPolicy {
    fn default() -> Self {
        Self::new(SENSITIVE_KEYS.iter().copied(), SENSITIVE_HEADERS.iter().copied())
    }
}
