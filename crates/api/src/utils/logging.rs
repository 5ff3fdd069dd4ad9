use std::time::Duration;

use ravenfleet_domain::FleetError;
use tracing::{info, warn};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` with `verbose`.
/// Logs go to stderr so command output on stdout stays machine-readable.
///
/// # Errors
/// Fails if a global subscriber is already installed.
pub fn init_tracing(verbose: bool, json: bool) -> anyhow::Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).try_init()?;
    } else {
        registry.with(fmt::layer().with_target(false).with_writer(std::io::stderr)).try_init()?;
    }
    Ok(())
}

/// Log the outcome of a command execution with structured fields.
///
/// Callers must avoid forwarding sensitive values in `command`.
#[inline]
pub fn log_command_execution(
    command: &str,
    elapsed: Duration,
    success: bool,
    error_type: Option<&str>,
) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    if success {
        info!(command, duration_ms, "command_execution_success");
    } else {
        warn!(command, duration_ms, error_type, "command_execution_failure");
    }
}

/// Convert a `FleetError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &FleetError) -> &'static str {
    error.label()
}
