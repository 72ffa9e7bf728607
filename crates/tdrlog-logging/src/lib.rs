//! Structured request logging
//!
//! Two logs per application: a system log for ordinary diagnostic records
//! and a transaction detail log with one record per request/response
//! exchange. Request context (trace id, source address, port, path) is
//! attached automatically, and sensitive values are masked before a
//! transaction record is written.
//!
//! ```no_run
//! use tdrlog_core_types::RequestContext;
//! use tdrlog_logging::{global, Config, Field, TransactionDetail};
//!
//! # fn main() -> tdrlog_errors::Result<()> {
//! let config = Config::from_file("logging.toml")?;
//! let logger = global::load(config)?;
//!
//! let ctx = RequestContext::traced().with_path("/api/v1/users");
//! logger.info(&ctx, "Request received", [Field::string("user", "u-1")]);
//! logger.tdr(&ctx, TransactionDetail::new("corr-1", "GET").with_status("200", 200));
//! logger.flush()?;
//! # Ok(())
//! # }
//! ```

pub mod bound;
pub mod config;
pub mod diagnostics;
pub mod extract;
pub mod field;
pub mod global;
pub mod headers;
pub mod level;
pub mod logger;
pub mod mask;
pub mod record;
pub mod sink;

pub use bound::BoundLogger;
pub use config::{Config, Environment, ValidatedConfig};
pub use field::Field;
pub use headers::{Headers, RawHeaders};
pub use level::Level;
pub use logger::Logger;
pub use mask::Payload;
pub use record::{LogRecord, TransactionDetail};
pub use sink::Sink;
