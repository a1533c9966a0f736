//! Logging infrastructure for radartiles.
//!
//! Structured logging with two outputs:
//! - an append-only log file (`~/.radartiles/logs/radartiles.log` by default)
//! - stderr, so `radartiles tile` keeps stdout for its own output
//!
//! The level is configurable via the `RUST_LOG` environment variable and
//! defaults to `info`.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard flushes and closes the log file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialize the global subscriber.
///
/// Creates `log_dir` if needed and appends to `log_file` inside it.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or a global
/// subscriber is already installed.
pub fn init_logging(log_dir: &Path, log_file: &str) -> Result<LoggingGuard, io::Error> {
    prepare_log_file(log_dir, log_file)?;

    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_target(true);

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(true)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter())
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(io::Error::other)?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Create the log directory and make sure the log file is writable.
///
/// Existing content is kept; the server appends across restarts.
pub fn prepare_log_file(log_dir: &Path, log_file: &str) -> Result<PathBuf, io::Error> {
    fs::create_dir_all(log_dir)?;
    let log_path = log_dir.join(log_file);
    OpenOptions::new().create(true).append(true).open(&log_path)?;
    Ok(log_path)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}
