//! Internal diagnostics
//!
//! The logger reports its own trouble (failed writes, pruning errors,
//! rotation) through `tracing`. Applications that want to see those events
//! call [`init`] once at startup; otherwise they are discarded.

use std::sync::Once;

use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

use crate::config::Environment;

/// Diagnostics output profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output at debug level
    Development,
    /// JSON output at info level
    Production,
    /// No output; tests assert on sinks instead
    Test,
}

impl From<Environment> for Profile {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => Profile::Development,
            Environment::Production => Profile::Production,
        }
    }
}

static INIT_ONCE: Once = Once::new();

/// Install the global `tracing` subscriber for the given profile
///
/// Only the first call has any effect. `RUST_LOG` overrides the default
/// filter. A subscriber installed elsewhere is left in place.
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let installed = match profile {
            Profile::Development => tracing_subscriber::fmt()
                .with_env_filter(filter("tdrlog_logging=debug"))
                .finish()
                .try_init(),
            Profile::Production => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter("tdrlog_logging=info"))
                .finish()
                .try_init(),
            Profile::Test => tracing_subscriber::registry().try_init(),
        };
        // Another subscriber already owns the process; keep it.
        let _ = installed;
    });
}

fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}
