//! Logging setup for binaries embedding the sync client
//!
//! `RUST_LOG` takes precedence over the configured default directive.

use tabsync_core::{SyncError, SyncResult};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human readable, one line per event
    #[default]
    Compact,
    /// One JSON object per event
    Json,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is unset
    pub default_directive: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            default_directive: "info".into(),
            format: LogFormat::Compact,
        }
    }
}

impl LogConfig {
    /// Debug output from the tabsync crates only
    pub fn verbose() -> Self {
        LogConfig {
            default_directive: "warn,tabsync_diff=debug,tabsync_runtime=debug".into(),
            ..Self::default()
        }
    }
}

/// Install the global subscriber. Fails if the directive does not parse or a
/// subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> SyncResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.default_directive))
        .map_err(|e| SyncError::invalid(format!("log filter: {}", e)))?;

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.format {
        LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
    };
    installed.map_err(|e| SyncError::invalid(format!("log subscriber: {}", e)))
}
