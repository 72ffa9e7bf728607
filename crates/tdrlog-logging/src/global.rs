//! Process-wide logger
//!
//! [`load`] builds the shared logger on first use; later calls return the
//! same instance and ignore their configuration. Until a load succeeds,
//! every logging function here is a no-op and [`flush`] reports success.

use std::error::Error;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tdrlog_core_types::RequestContext;
use tdrlog_errors::Result;
use tracing::debug;

use crate::bound::BoundLogger;
use crate::config::Config;
use crate::field::Field;
use crate::logger::Logger;
use crate::record::TransactionDetail;

static LOGGER: RwLock<Option<Arc<Logger>>> = RwLock::new(None);
// Serializes construction so concurrent loads build at most one logger.
static INIT: Mutex<()> = Mutex::new(());

fn read_slot() -> RwLockReadGuard<'static, Option<Arc<Logger>>> {
    LOGGER.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_slot() -> RwLockWriteGuard<'static, Option<Arc<Logger>>> {
    LOGGER.write().unwrap_or_else(PoisonError::into_inner)
}

/// Build the shared logger, or return the one already built
///
/// # Errors
///
/// Returns the construction error. The accessor stays unconfigured, so a
/// later call may try again.
pub fn load(config: Config) -> Result<Arc<Logger>> {
    if let Some(logger) = get() {
        return Ok(logger);
    }
    let _guard = INIT.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(logger) = get() {
        return Ok(logger);
    }

    let logger = Arc::new(Logger::new(config)?);
    *write_slot() = Some(Arc::clone(&logger));
    debug!("Process-wide logger installed");
    Ok(logger)
}

/// The shared logger, if one has been loaded
pub fn get() -> Option<Arc<Logger>> {
    read_slot().clone()
}

/// Forget the shared logger so the next [`load`] builds a new one
///
/// Loggers already handed out keep working.
#[doc(hidden)]
pub fn reset() {
    let _guard = INIT.lock().unwrap_or_else(PoisonError::into_inner);
    *write_slot() = None;
}

pub fn with_context(ctx: RequestContext) -> Option<BoundLogger> {
    get().map(|logger| logger.with_context(ctx))
}

pub fn debug(ctx: &RequestContext, message: &str, fields: impl IntoIterator<Item = Field>) {
    if let Some(logger) = get() {
        logger.debug(ctx, message, fields);
    }
}

pub fn info(ctx: &RequestContext, message: &str, fields: impl IntoIterator<Item = Field>) {
    if let Some(logger) = get() {
        logger.info(ctx, message, fields);
    }
}

pub fn warn(ctx: &RequestContext, message: &str, fields: impl IntoIterator<Item = Field>) {
    if let Some(logger) = get() {
        logger.warn(ctx, message, fields);
    }
}

pub fn error(
    ctx: &RequestContext,
    message: &str,
    err: Option<&(dyn Error + '_)>,
    fields: impl IntoIterator<Item = Field>,
) {
    if let Some(logger) = get() {
        logger.error(ctx, message, err, fields);
    }
}

/// Log at Fatal and exit; does nothing when no logger is loaded
pub fn fatal(
    ctx: &RequestContext,
    message: &str,
    err: Option<&(dyn Error + '_)>,
    fields: impl IntoIterator<Item = Field>,
) {
    if let Some(logger) = get() {
        logger.fatal(ctx, message, err, fields);
    }
}

/// Log at Panic and panic; does nothing when no logger is loaded
pub fn panic(
    ctx: &RequestContext,
    message: &str,
    err: Option<&(dyn Error + '_)>,
    fields: impl IntoIterator<Item = Field>,
) {
    if let Some(logger) = get() {
        logger.panic(ctx, message, err, fields);
    }
}

pub fn tdr(ctx: &RequestContext, tdr: TransactionDetail) {
    if let Some(logger) = get() {
        logger.tdr(ctx, tdr);
    }
}

/// # Errors
///
/// Returns the first sink flush failure of the shared logger.
pub fn flush() -> Result<()> {
    match get() {
        Some(logger) => logger.flush(),
        None => Ok(()),
    }
}
