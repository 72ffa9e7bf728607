//! Log record assembly
//!
//! A [`LogRecord`] is built fresh for every call. Standard records carry
//! the caller's fields, then the context fields, then (for Error and
//! above) the error. Transaction detail records carry a fixed sequence of
//! request/response fields and a placeholder message.

use std::time::Duration;

use serde_json::Value;
use tdrlog_core_types::schema::{
    FIELD_CORRELATION_ID, FIELD_ERROR, FIELD_HEADER, FIELD_HTTP_STATUS, FIELD_METHOD,
    FIELD_OTHER_DATA, FIELD_REQUEST, FIELD_RESPONSE, FIELD_RESPONSE_TIME,
    FIELD_STATUS_CODE, TDR_MESSAGE,
};
use tdrlog_core_types::{MaskingPolicy, RequestContext};

use crate::extract::context_fields;
use crate::field::Field;
use crate::headers::{strip_sensitive_headers, Headers};
use crate::level::Level;
use crate::mask::{mask, normalize, unwrap_json_text, Payload};

/// A finished record, ready for a sink
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub level: Level,
    pub message: String,
    pub fields: Vec<Field>,
}

impl LogRecord {
    /// First field with the given key
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.key == key).map(|f| &f.value)
    }

    /// Keys in emission order
    pub fn keys(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.key.as_str()).collect()
    }
}

/// One request/response exchange
#[derive(Debug, Clone, Default)]
pub struct TransactionDetail {
    pub correlation_id: String,
    pub method: String,
    pub status_code: String,
    pub http_status: u64,
    pub request: Option<Payload>,
    pub response: Option<Payload>,
    pub headers: Option<Headers>,
    pub response_time: Duration,
    pub error: Option<String>,
    pub other_data: Option<Payload>,
}

impl TransactionDetail {
    pub fn new(correlation_id: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            method: method.into(),
            ..Self::default()
        }
    }

    /// Set the application status code and the HTTP status
    pub fn with_status(mut self, status_code: impl Into<String>, http_status: u64) -> Self {
        self.status_code = status_code.into();
        self.http_status = http_status;
        self
    }

    pub fn with_request(mut self, request: impl Into<Payload>) -> Self {
        self.request = Some(request.into());
        self
    }

    pub fn with_response(mut self, response: impl Into<Payload>) -> Self {
        self.response = Some(response.into());
        self
    }

    pub fn with_headers(mut self, headers: impl Into<Headers>) -> Self {
        self.headers = Some(headers.into());
        self
    }

    pub fn with_response_time(mut self, response_time: Duration) -> Self {
        self.response_time = response_time;
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_other_data(mut self, other_data: impl Into<Payload>) -> Self {
        self.other_data = Some(other_data.into());
        self
    }
}

/// Build a system log record
///
/// `error` is only consulted for Error, Fatal and Panic; those levels
/// always carry an `error` field (`null` when no error was given).
pub fn build_standard(
    ctx: &RequestContext,
    level: Level,
    message: impl Into<String>,
    mut fields: Vec<Field>,
    error: Option<&(dyn std::error::Error + '_)>,
) -> LogRecord {
    fields.extend(context_fields(ctx));
    if level.carries_error() {
        let value = error
            .map(|e| unwrap_json_text(e.to_string()))
            .unwrap_or(Value::Null);
        fields.push(Field::new(FIELD_ERROR, value));
    }
    LogRecord {
        level,
        message: message.into(),
        fields,
    }
}

/// Build a transaction detail record with headers stripped and bodies masked
pub fn build_transaction(
    ctx: &RequestContext,
    tdr: TransactionDetail,
    policy: &MaskingPolicy,
) -> LogRecord {
    let mut fields = context_fields(ctx);

    let header = tdr
        .headers
        .map(|h| strip_sensitive_headers(h, policy).into_value())
        .unwrap_or(Value::Null);
    let rt = i64::try_from(tdr.response_time.as_millis()).unwrap_or(i64::MAX);

    fields.push(Field::string(FIELD_CORRELATION_ID, tdr.correlation_id));
    fields.push(Field::new(FIELD_HEADER, header));
    fields.push(Field::new(FIELD_REQUEST, normalize(mask(tdr.request, policy))));
    fields.push(Field::string(FIELD_STATUS_CODE, tdr.status_code));
    fields.push(Field::string(FIELD_METHOD, tdr.method));
    fields.push(Field::u64(FIELD_HTTP_STATUS, tdr.http_status));
    fields.push(Field::new(FIELD_RESPONSE, normalize(mask(tdr.response, policy))));
    fields.push(Field::i64(FIELD_RESPONSE_TIME, rt));
    fields.push(Field::new(
        FIELD_ERROR,
        tdr.error.map(unwrap_json_text).unwrap_or(Value::Null),
    ));
    fields.push(Field::new(FIELD_OTHER_DATA, normalize(tdr.other_data)));

    LogRecord {
        level: Level::Info,
        message: TDR_MESSAGE.to_string(),
        fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct TestError(&'static str);

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.0)
        }
    }

    impl std::error::Error for TestError {}

    #[test]
    fn test_standard_field_order() {
        let ctx = RequestContext::new().with_trace_id("t1").with_path("/p");
        let record = build_standard(
            &ctx,
            Level::Info,
            "hello",
            vec![Field::string("key", "value")],
            None,
        );

        assert_eq!(record.message, "hello");
        assert_eq!(record.keys(), vec!["key", "traceId", "path"]);
    }

    #[test]
    fn test_info_ignores_error() {
        let err = TestError("boom");
        let record = build_standard(&RequestContext::new(), Level::Warn, "m", vec![], Some(&err));
        assert!(record.field(FIELD_ERROR).is_none());
    }

    #[test]
    fn test_error_field_is_last() {
        let err = TestError("file not found");
        let ctx = RequestContext::new().with_trace_id("t1");
        let record = build_standard(
            &ctx,
            Level::Error,
            "failed",
            vec![Field::string("filename", "test.txt")],
            Some(&err),
        );

        assert_eq!(record.keys(), vec!["filename", "traceId", "error"]);
        assert_eq!(record.field("error"), Some(&json!("file not found")));
    }

    #[test]
    fn test_json_error_message_is_expanded() {
        let err = TestError(r#"{"code":"E42","detail":"bad"}"#);
        let record = build_standard(&RequestContext::new(), Level::Error, "m", vec![], Some(&err));
        assert_eq!(
            record.field("error"),
            Some(&json!({"code": "E42", "detail": "bad"}))
        );
    }

    #[test]
    fn test_missing_error_is_null() {
        let record = build_standard(&RequestContext::new(), Level::Fatal, "m", vec![], None);
        assert_eq!(record.field("error"), Some(&Value::Null));
    }

    #[test]
    fn test_duplicate_keys_preserved() {
        let ctx = RequestContext::new().with_trace_id("ctx");
        let record = build_standard(
            &ctx,
            Level::Info,
            "m",
            vec![Field::string("traceId", "caller")],
            None,
        );
        assert_eq!(record.keys(), vec!["traceId", "traceId"]);
        assert_eq!(record.fields[0].value, json!("caller"));
        assert_eq!(record.fields[1].value, json!("ctx"));
    }

    #[test]
    fn test_transaction_field_order() {
        let ctx = RequestContext::new()
            .with_trace_id("trace-123")
            .with_path("/api/test");
        let tdr = TransactionDetail::new("corr-456", "POST")
            .with_status("200", 200)
            .with_request(json!({"name": "test"}))
            .with_response(json!({"id": 1}))
            .with_response_time(Duration::from_millis(100));

        let record = build_transaction(&ctx, tdr, &MaskingPolicy::default());

        assert_eq!(record.level, Level::Info);
        assert_eq!(record.message, ":");
        assert_eq!(
            record.keys(),
            vec![
                "traceId",
                "path",
                "correlationId",
                "header",
                "request",
                "statusCode",
                "method",
                "httpStatus",
                "response",
                "rt",
                "error",
                "otherData"
            ]
        );
        assert_eq!(record.field("rt"), Some(&json!(100)));
        assert_eq!(record.field("httpStatus"), Some(&json!(200)));
        assert_eq!(record.field("statusCode"), Some(&json!("200")));
        assert_eq!(record.field("header"), Some(&Value::Null));
        assert_eq!(record.field("error"), Some(&Value::Null));
    }

    #[test]
    fn test_transaction_path_comes_only_from_context() {
        let tdr = TransactionDetail::new("c", "GET");
        let record = build_transaction(&RequestContext::new(), tdr, &MaskingPolicy::default());
        assert_eq!(record.field("path"), None);
        assert_eq!(record.keys()[0], "correlationId");
    }

    #[test]
    fn test_transaction_masks_json_string_body() {
        let tdr = TransactionDetail::new("c", "POST")
            .with_request(json!(r#"{"username":"john","password":"secret123"}"#))
            .with_response(json!("plain text"));

        let record = build_transaction(&RequestContext::new(), tdr, &MaskingPolicy::default());
        assert_eq!(
            record.field("request"),
            Some(&json!({"username": "john", "password": "*****"}))
        );
        assert_eq!(record.field("response"), Some(&json!("plain text")));
    }

    #[test]
    fn test_transaction_bodies_are_masked() {
        let tdr = TransactionDetail::new("c", "POST")
            .with_request(br#"{"username":"john","password":"secret123"}"#.to_vec())
            .with_response(r#"{"access_token":"a","refresh_token":"r","ok":true}"#);

        let record = build_transaction(&RequestContext::new(), tdr, &MaskingPolicy::default());
        assert_eq!(
            record.field("request"),
            Some(&json!({"username": "john", "password": "*****"}))
        );
        assert_eq!(
            record.field("response"),
            Some(&json!({"access_token": "*****", "refresh_token": "*****", "ok": true}))
        );
    }

    #[test]
    fn test_transaction_malformed_body_kept_as_text() {
        let tdr = TransactionDetail::new("c", "POST").with_request("<xml/>");
        let record = build_transaction(&RequestContext::new(), tdr, &MaskingPolicy::default());
        assert_eq!(record.field("request"), Some(&json!("<xml/>")));
    }

    #[test]
    fn test_transaction_error_and_other_data() {
        let tdr = TransactionDetail::new("c", "GET")
            .with_error(r#"{"reason":"timeout"}"#)
            .with_other_data(json!({"retry": 2}));

        let record = build_transaction(&RequestContext::new(), tdr, &MaskingPolicy::default());
        assert_eq!(record.field("error"), Some(&json!({"reason": "timeout"})));
        assert_eq!(record.field("otherData"), Some(&json!({"retry": 2})));
    }
}
