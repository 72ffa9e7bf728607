//! Request-scoped context carried into every log call
//!
//! A `RequestContext` holds the identity of the request being served
//! (trace id, source address, port, path). Values can be stored under a
//! typed [`ContextKey`] or, for callers that predate the typed keys, under
//! a plain string key with the same name.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trace identifier propagated across service boundaries
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceId(String);

impl TraceId {
    /// Generate a new random TraceId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the id and return the inner string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TraceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TraceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Typed keys for the request identity slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKey {
    TraceId,
    SrcIp,
    Port,
    Path,
}

impl ContextKey {
    /// Canonical name of the key; also the legacy string key for the same slot
    pub fn name(&self) -> &'static str {
        match self {
            ContextKey::TraceId => crate::schema::FIELD_TRACE_ID,
            ContextKey::SrcIp => crate::schema::FIELD_SRC_IP,
            ContextKey::Port => crate::schema::FIELD_PORT,
            ContextKey::Path => crate::schema::FIELD_PATH,
        }
    }
}

/// Read-only key/value carrier for one request
///
/// Builder methods consume and return the context so a handler can
/// derive a richer context without touching the caller's copy.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    typed: HashMap<ContextKey, String>,
    legacy: HashMap<String, String>,
}

impl RequestContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context carrying a freshly generated trace id
    pub fn traced() -> Self {
        Self::new().with_trace_id(TraceId::new())
    }

    /// Store a trace id under the typed key
    pub fn with_trace_id(self, trace_id: impl Into<TraceId>) -> Self {
        self.with_typed(ContextKey::TraceId, trace_id.into().into_string())
    }

    /// Store the source IP under the typed key
    pub fn with_src_ip(self, src_ip: impl Into<String>) -> Self {
        self.with_typed(ContextKey::SrcIp, src_ip)
    }

    /// Store the port under the typed key
    pub fn with_port(self, port: impl Into<String>) -> Self {
        self.with_typed(ContextKey::Port, port)
    }

    /// Store the request path under the typed key
    pub fn with_path(self, path: impl Into<String>) -> Self {
        self.with_typed(ContextKey::Path, path)
    }

    /// Store a value under a typed key
    pub fn with_typed(mut self, key: ContextKey, value: impl Into<String>) -> Self {
        self.typed.insert(key, value.into());
        self
    }

    /// Store a value under a plain string key (legacy callers)
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.legacy.insert(key.into(), value.into());
        self
    }

    /// Look up a typed entry
    pub fn typed(&self, key: ContextKey) -> Option<&str> {
        self.typed.get(&key).map(String::as_str)
    }

    /// Look up a plain string entry
    pub fn legacy(&self, key: &str) -> Option<&str> {
        self.legacy.get(key).map(String::as_str)
    }

    /// Trace id stored under the typed key
    pub fn trace_id(&self) -> Option<&str> {
        self.typed(ContextKey::TraceId)
    }

    /// Source IP stored under the typed key
    pub fn src_ip(&self) -> Option<&str> {
        self.typed(ContextKey::SrcIp)
    }

    /// Port stored under the typed key
    pub fn port(&self) -> Option<&str> {
        self.typed(ContextKey::Port)
    }

    /// Path stored under the typed key
    pub fn path(&self) -> Option<&str> {
        self.typed(ContextKey::Path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_id_generation() {
        let id1 = TraceId::new();
        let id2 = TraceId::new();

        assert_ne!(id1, id2);
        assert!(!id1.as_str().is_empty());
    }

    #[test]
    fn test_trace_id_display() {
        let id = TraceId::new();
        assert_eq!(format!("{}", id), id.as_str());
    }

    #[test]
    fn test_typed_getters() {
        let ctx = RequestContext::new()
            .with_trace_id("trace-123")
            .with_src_ip("192.168.1.1")
            .with_port("8080")
            .with_path("/test");

        assert_eq!(ctx.trace_id(), Some("trace-123"));
        assert_eq!(ctx.src_ip(), Some("192.168.1.1"));
        assert_eq!(ctx.port(), Some("8080"));
        assert_eq!(ctx.path(), Some("/test"));
    }

    #[test]
    fn test_legacy_values_are_not_typed() {
        let ctx = RequestContext::new().with_value("traceId", "trace-456");

        assert_eq!(ctx.trace_id(), None);
        assert_eq!(ctx.legacy("traceId"), Some("trace-456"));
    }

    #[test]
    fn test_builder_leaves_original_untouched() {
        let base = RequestContext::new().with_trace_id("t1");
        let derived = base.clone().with_path("/child");

        assert_eq!(base.path(), None);
        assert_eq!(derived.path(), Some("/child"));
        assert_eq!(derived.trace_id(), Some("t1"));
    }

    #[test]
    fn test_traced_context_has_trace_id() {
        let ctx = RequestContext::traced();
        assert!(ctx.trace_id().is_some_and(|t| !t.is_empty()));
    }

    #[test]
    fn test_context_key_names() {
        assert_eq!(ContextKey::TraceId.name(), "traceId");
        assert_eq!(ContextKey::SrcIp.name(), "srcIP");
        assert_eq!(ContextKey::Port.name(), "port");
        assert_eq!(ContextKey::Path.name(), "path");
    }

    #[test]
    fn test_trace_id_serialization() {
        let id = TraceId::from("trace-789");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"trace-789\"");
        let back: TraceId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
