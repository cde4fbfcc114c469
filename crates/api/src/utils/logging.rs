use std::time::Duration;

use dailytrack_domain::{LoggingConfig, TrackerError};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` wins; otherwise `config.level` is the filter directive, with
/// `info` as the last resort when that does not parse. Returns `false` when
/// a subscriber was already installed.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if config.json {
        registry.with(tracing_subscriber::fmt::layer().json().with_target(true)).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer().with_target(false)).try_init()
    };
    installed.is_ok()
}

/// Log the outcome of a binary command with structured fields.
///
/// `command` should be a stable identifier without credentials.
#[inline]
pub fn log_command_execution(command: &str, elapsed: Duration, success: bool) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    if success {
        info!(command, duration_ms, "command_execution_success");
    } else {
        warn!(command, duration_ms, "command_execution_failure");
    }
}

/// Stable label for an error, suitable for log fields.
#[inline]
pub fn error_label(error: &TrackerError) -> &'static str {
    match error {
        TrackerError::Config(_) => "config",
        TrackerError::Network(_) => "network",
        TrackerError::Auth(_) => "auth",
        TrackerError::Storage(_) => "storage",
        TrackerError::NotFound(_) => "not_found",
        TrackerError::InvalidInput(_) => "invalid_input",
        TrackerError::Forbidden(_) => "forbidden",
        TrackerError::Internal(_) => "internal",
    }
}
