//! Logger with a bound request context

use std::error::Error;
use std::sync::Arc;

use tdrlog_core_types::RequestContext;
use tdrlog_errors::Result;

use crate::field::Field;
use crate::logger::Logger;
use crate::record::TransactionDetail;

/// A logger paired with the context of one request
///
/// Cloning is cheap; every clone shares the underlying logger.
#[derive(Clone)]
pub struct BoundLogger {
    logger: Arc<Logger>,
    ctx: RequestContext,
}

impl BoundLogger {
    pub fn new(logger: Arc<Logger>, ctx: RequestContext) -> Self {
        Self { logger, ctx }
    }

    pub fn context(&self) -> &RequestContext {
        &self.ctx
    }

    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }

    /// Same logger, different context
    pub fn with_context(&self, ctx: RequestContext) -> Self {
        Self::new(Arc::clone(&self.logger), ctx)
    }

    pub fn debug(&self, message: &str, fields: impl IntoIterator<Item = Field>) {
        self.logger.debug(&self.ctx, message, fields);
    }

    pub fn info(&self, message: &str, fields: impl IntoIterator<Item = Field>) {
        self.logger.info(&self.ctx, message, fields);
    }

    pub fn warn(&self, message: &str, fields: impl IntoIterator<Item = Field>) {
        self.logger.warn(&self.ctx, message, fields);
    }

    pub fn error(
        &self,
        message: &str,
        err: Option<&(dyn Error + '_)>,
        fields: impl IntoIterator<Item = Field>,
    ) {
        self.logger.error(&self.ctx, message, err, fields);
    }

    pub fn fatal(
        &self,
        message: &str,
        err: Option<&(dyn Error + '_)>,
        fields: impl IntoIterator<Item = Field>,
    ) -> ! {
        self.logger.fatal(&self.ctx, message, err, fields)
    }

    pub fn panic(
        &self,
        message: &str,
        err: Option<&(dyn Error + '_)>,
        fields: impl IntoIterator<Item = Field>,
    ) -> ! {
        self.logger.panic(&self.ctx, message, err, fields)
    }

    pub fn tdr(&self, tdr: TransactionDetail) {
        self.logger.tdr(&self.ctx, tdr);
    }

    /// # Errors
    ///
    /// Returns the first sink flush failure.
    pub fn flush(&self) -> Result<()> {
        self.logger.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::baseline_fields;
    use crate::sink::CaptureSink;
    use serde_json::json;

    #[test]
    fn test_bound_context_is_applied() {
        let (system, capture) = CaptureSink::new();
        let (tdr, tdr_capture) = CaptureSink::new();
        let logger = Arc::new(Logger::with_sinks(
            Arc::new(system),
            Arc::new(tdr),
            baseline_fields("a", "1", "development"),
        ));

        let bound = logger.with_context(RequestContext::new().with_trace_id("t-1").with_path("/x"));
        bound.info("first", []);
        bound
            .with_context(RequestContext::new().with_trace_id("t-2"))
            .warn("second", [Field::bool("retry", true)]);
        bound.tdr(TransactionDetail::new("c", "GET"));

        let records = capture.records();
        assert_eq!(records[0].field("traceId"), Some(&json!("t-1")));
        assert_eq!(records[0].field("path"), Some(&json!("/x")));
        assert_eq!(records[1].field("traceId"), Some(&json!("t-2")));
        assert_eq!(records[1].field("path"), None);
        assert_eq!(tdr_capture.last().unwrap().field("path"), Some(&json!("/x")));
    }
}
