//! Canonical schema constants for emitted log records
//!
//! Every key written by the logging crate comes from here, so the JSON
//! shape stays stable for log shippers and queries.

// Context fields
pub const FIELD_TRACE_ID: &str = "traceId";
pub const FIELD_SRC_IP: &str = "srcIP";
pub const FIELD_PORT: &str = "port";
pub const FIELD_PATH: &str = "path";

// Baseline fields attached by every logger
pub const FIELD_APP: &str = "app";
pub const FIELD_APP_VER: &str = "appVer";
pub const FIELD_ENV: &str = "env";

// Error fields
pub const FIELD_ERROR: &str = "error";
pub const FIELD_STACKTRACE: &str = "stacktrace";

// Transaction detail fields
pub const FIELD_CORRELATION_ID: &str = "correlationId";
pub const FIELD_HEADER: &str = "header";
pub const FIELD_REQUEST: &str = "request";
pub const FIELD_STATUS_CODE: &str = "statusCode";
pub const FIELD_METHOD: &str = "method";
pub const FIELD_HTTP_STATUS: &str = "httpStatus";
pub const FIELD_RESPONSE: &str = "response";
pub const FIELD_RESPONSE_TIME: &str = "rt";
pub const FIELD_OTHER_DATA: &str = "otherData";

// Encoder keys
pub const KEY_TIMESTAMP: &str = "timestamp";
pub const KEY_LEVEL: &str = "logLevel";
pub const KEY_MESSAGE: &str = "message";

/// Message text of every transaction detail record
pub const TDR_MESSAGE: &str = ":";
