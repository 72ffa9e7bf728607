//! Dual-sink logger
//!
//! A [`Logger`] owns two sinks: the system log and the transaction detail
//! log. Both receive the same baseline fields (application name, version,
//! environment). A logger is ready as soon as it is constructed and stays
//! that way; `flush` does not close it.
//!
//! System records at Error and above also carry a `stacktrace` field
//! captured at the call site.

use std::backtrace::Backtrace;
use std::error::Error;
use std::io;
use std::sync::Arc;

use tdrlog_core_types::schema::{FIELD_APP, FIELD_APP_VER, FIELD_ENV, FIELD_STACKTRACE};
use tdrlog_core_types::{MaskingPolicy, RequestContext};
use tdrlog_errors::{LogError, Result};
use tracing::{debug, warn};

use crate::bound::BoundLogger;
use crate::config::{Config, Environment, ValidatedConfig};
use crate::field::Field;
use crate::level::Level;
use crate::record::{build_standard, build_transaction, LogRecord, TransactionDetail};
use crate::sink::{Encoding, RotatingFile, Sink, Tee, WriterSink};

const SYSTEM_SINK: &str = "system";
const TDR_SINK: &str = "tdr";

/// Logger writing system records and transaction detail records to separate sinks
pub struct Logger {
    system: Arc<dyn Sink>,
    transaction: Arc<dyn Sink>,
    baseline: Vec<Field>,
    policy: MaskingPolicy,
}

impl Logger {
    /// Validate `config` and open both rotating log files
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a bad configuration and an I/O error if
    /// either log file cannot be opened.
    pub fn new(config: Config) -> Result<Self> {
        let validated = config.validate()?;
        Self::from_validated(&validated)
    }

    /// Build from an already validated configuration
    ///
    /// # Errors
    ///
    /// Returns an I/O error if either log file cannot be opened.
    pub fn from_validated(config: &ValidatedConfig) -> Result<Self> {
        let system_file = RotatingFile::open(&config.system_log_path, config.rotation)?;
        let tdr_file = RotatingFile::open(&config.tdr_log_path, config.rotation)?;

        let mut system = Tee::new().with(Arc::new(WriterSink::json(system_file, config.log_level)));
        let mut transaction = Tee::new().with(Arc::new(WriterSink::json(tdr_file, config.log_level)));
        if config.stdout {
            let encoding = echo_encoding(config.env);
            system = system.with(Arc::new(WriterSink::new(
                io::stdout(),
                encoding,
                config.log_level,
            )));
            transaction = transaction.with(Arc::new(WriterSink::new(
                io::stdout(),
                encoding,
                config.log_level,
            )));
        }

        debug!(
            app = %config.app,
            app_ver = %config.app_ver,
            env = %config.env,
            system_log = %config.system_log_path.display(),
            tdr_log = %config.tdr_log_path.display(),
            level = %config.log_level,
            "Logger configured"
        );

        Ok(Self::with_sinks(
            Arc::new(system),
            Arc::new(transaction),
            baseline_fields(&config.app, &config.app_ver, config.env.as_str()),
        ))
    }

    /// Build over caller-supplied sinks
    pub fn with_sinks(
        system: Arc<dyn Sink>,
        transaction: Arc<dyn Sink>,
        baseline: Vec<Field>,
    ) -> Self {
        Self {
            system,
            transaction,
            baseline,
            policy: MaskingPolicy::default(),
        }
    }

    /// Replace the masking policy used for transaction detail records
    pub fn with_policy(mut self, policy: MaskingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fields attached to every record from this logger
    pub fn baseline(&self) -> &[Field] {
        &self.baseline
    }

    /// Bind a context so later calls need not repeat it
    pub fn with_context(self: &Arc<Self>, ctx: RequestContext) -> BoundLogger {
        BoundLogger::new(Arc::clone(self), ctx)
    }

    /// Write a finished record to one of the two sinks
    ///
    /// A write failure is reported through `tracing` and otherwise
    /// ignored; logging never fails the caller.
    pub fn emit(&self, record: &LogRecord, to_transaction_sink: bool) {
        let (sink, name) = if to_transaction_sink {
            (&self.transaction, TDR_SINK)
        } else {
            (&self.system, SYSTEM_SINK)
        };
        if let Err(e) = sink.write(record, &self.baseline) {
            warn!(sink = name, error = %e, "Failed to write log record");
        }
    }

    pub fn debug(
        &self,
        ctx: &RequestContext,
        message: &str,
        fields: impl IntoIterator<Item = Field>,
    ) {
        self.log(ctx, Level::Debug, message, None, fields);
    }

    pub fn info(&self, ctx: &RequestContext, message: &str, fields: impl IntoIterator<Item = Field>) {
        self.log(ctx, Level::Info, message, None, fields);
    }

    pub fn warn(&self, ctx: &RequestContext, message: &str, fields: impl IntoIterator<Item = Field>) {
        self.log(ctx, Level::Warn, message, None, fields);
    }

    pub fn error(
        &self,
        ctx: &RequestContext,
        message: &str,
        err: Option<&(dyn Error + '_)>,
        fields: impl IntoIterator<Item = Field>,
    ) {
        self.log(ctx, Level::Error, message, err, fields);
    }

    /// Log at Fatal, flush both sinks, then exit the process with status 1
    pub fn fatal(
        &self,
        ctx: &RequestContext,
        message: &str,
        err: Option<&(dyn Error + '_)>,
        fields: impl IntoIterator<Item = Field>,
    ) -> ! {
        self.log(ctx, Level::Fatal, message, err, fields);
        self.flush_before_exit();
        std::process::exit(1)
    }

    /// Log at Panic, flush both sinks, then panic with the message
    pub fn panic(
        &self,
        ctx: &RequestContext,
        message: &str,
        err: Option<&(dyn Error + '_)>,
        fields: impl IntoIterator<Item = Field>,
    ) -> ! {
        self.log(ctx, Level::Panic, message, err, fields);
        self.flush_before_exit();
        panic!("{message}")
    }

    /// Record one request/response exchange on the transaction detail sink
    pub fn tdr(&self, ctx: &RequestContext, tdr: TransactionDetail) {
        let record = build_transaction(ctx, tdr, &self.policy);
        self.emit(&record, true);
    }

    /// Flush both sinks
    ///
    /// The transaction detail sink is flushed even when the system sink
    /// fails; the first failure is returned.
    ///
    /// # Errors
    ///
    /// Returns `Flush` naming the sink that failed first.
    pub fn flush(&self) -> Result<()> {
        let system = self
            .system
            .flush()
            .map_err(|e| LogError::flush(SYSTEM_SINK, e));
        let transaction = self
            .transaction
            .flush()
            .map_err(|e| LogError::flush(TDR_SINK, e));
        system.and(transaction)
    }

    fn flush_before_exit(&self) {
        if let Err(e) = self.flush() {
            warn!(error = %e, "Failed to flush logs before exit");
        }
    }

    fn log(
        &self,
        ctx: &RequestContext,
        level: Level,
        message: &str,
        err: Option<&(dyn Error + '_)>,
        fields: impl IntoIterator<Item = Field>,
    ) {
        let mut record = build_standard(ctx, level, message, fields.into_iter().collect(), err);
        if level.carries_error() {
            record.fields.push(Field::string(
                FIELD_STACKTRACE,
                Backtrace::force_capture().to_string(),
            ));
        }
        self.emit(&record, false);
    }
}

/// Console echo format: readable lines in development, JSON in production
pub fn echo_encoding(env: Environment) -> Encoding {
    match env {
        Environment::Development => Encoding::Console,
        Environment::Production => Encoding::Json,
    }
}

/// Baseline fields in their fixed order
pub fn baseline_fields(app: &str, app_ver: &str, env: &str) -> Vec<Field> {
    vec![
        Field::string(FIELD_APP, app),
        Field::string(FIELD_APP_VER, app_ver),
        Field::string(FIELD_ENV, env),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{CaptureSink, TestCapture};
    use serde_json::json;

    struct FailingFlush;

    impl Sink for FailingFlush {
        fn write(&self, _record: &LogRecord, _baseline: &[Field]) -> Result<()> {
            Ok(())
        }

        fn flush(&self) -> Result<()> {
            Err(std::io::Error::other("flush refused").into())
        }
    }

    fn logger() -> (Logger, TestCapture, TestCapture) {
        let (system, system_capture) = CaptureSink::new();
        let (tdr, tdr_capture) = CaptureSink::new();
        let logger = Logger::with_sinks(
            Arc::new(system),
            Arc::new(tdr),
            baseline_fields("testapp", "1.0.0", "development"),
        );
        (logger, system_capture, tdr_capture)
    }

    #[test]
    fn test_info_goes_to_system_sink() {
        let (logger, system, tdr) = logger();
        let ctx = RequestContext::new().with_trace_id("trace-123");

        logger.info(&ctx, "Test message", [Field::string("key", "value")]);

        assert!(tdr.records().is_empty());
        let record = system.last().unwrap();
        assert_eq!(record.message, "Test message");
        assert_eq!(record.keys(), vec!["app", "appVer", "env", "key", "traceId"]);
    }

    #[test]
    fn test_tdr_goes_to_transaction_sink() {
        let (logger, system, tdr) = logger();

        logger.tdr(
            &RequestContext::new(),
            TransactionDetail::new("corr-1", "GET").with_status("200", 200),
        );

        assert!(system.records().is_empty());
        let record = tdr.last().unwrap();
        assert_eq!(record.message, ":");
        assert_eq!(record.field("correlationId"), Some(&json!("corr-1")));
        assert_eq!(record.field("app"), Some(&json!("testapp")));
    }

    #[test]
    fn test_error_carries_error_field() {
        let (logger, system, _) = logger();
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist");

        logger.error(
            &RequestContext::new(),
            "Test error",
            Some(&err),
            [Field::string("filename", "test.txt")],
        );

        let record = system.last().unwrap();
        assert_eq!(record.level, Level::Error);
        assert_eq!(record.field("error"), Some(&json!("file does not exist")));
        assert_eq!(record.keys().last(), Some(&"stacktrace"));
        let stacktrace = record.field("stacktrace").and_then(|v| v.as_str()).unwrap();
        assert!(!stacktrace.is_empty());
    }

    #[test]
    fn test_stacktrace_only_on_error_levels() {
        let (logger, system, tdr) = logger();
        let ctx = RequestContext::new();

        logger.warn(&ctx, "w", []);
        logger.error(&ctx, "e", None, []);
        logger.tdr(&ctx, TransactionDetail::new("c", "GET"));

        let records = system.records();
        assert_eq!(records[0].field("stacktrace"), None);
        assert!(records[1].field("stacktrace").is_some());
        assert_eq!(tdr.last().unwrap().field("stacktrace"), None);
    }

    #[test]
    fn test_echo_encoding_follows_environment() {
        assert_eq!(echo_encoding(Environment::Development), Encoding::Console);
        assert_eq!(echo_encoding(Environment::Production), Encoding::Json);
    }

    #[test]
    fn test_panic_survives_flush_failure() {
        let (system, capture) = CaptureSink::new();
        let logger = Logger::with_sinks(
            Arc::new(system),
            Arc::new(Tee::new().with(Arc::new(FailingFlush))),
            baseline_fields("a", "1", "production"),
        );

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            logger.panic(&RequestContext::new(), "boom", None, []);
        }));

        assert!(result.is_err());
        assert_eq!(capture.last().unwrap().message, "boom");
        assert_eq!(capture.flush_count(), 1);
    }

    #[test]
    fn test_panic_emits_then_panics() {
        let (logger, system, _) = logger();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            logger.panic(&RequestContext::new(), "Unexpected error", None, []);
        }));

        assert!(result.is_err());
        let record = system.last().unwrap();
        assert_eq!(record.level, Level::Panic);
        assert_eq!(record.message, "Unexpected error");
        assert_eq!(system.flush_count(), 1);
    }

    #[test]
    fn test_flush_reaches_both_sinks() {
        let (logger, system, tdr) = logger();
        logger.flush().unwrap();
        logger.flush().unwrap();
        assert_eq!(system.flush_count(), 2);
        assert_eq!(tdr.flush_count(), 2);
    }

    #[test]
    fn test_with_policy_changes_masking() {
        let (logger, _, tdr) = logger();
        let logger = logger.with_policy(MaskingPolicy::new(["pin"], Vec::<String>::new()));

        logger.tdr(
            &RequestContext::new(),
            TransactionDetail::new("c", "POST").with_request(json!({"pin": "1234", "password": "p"})),
        );

        let record = tdr.last().unwrap();
        assert_eq!(
            record.field("request"),
            Some(&json!({"pin": "*****", "password": "p"}))
        );
    }
}
