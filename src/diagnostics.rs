//! Operator diagnostics infrastructure.
//!
//! The coordinator and the flush daemon emit their own diagnostics through
//! `tracing` (grants, denials, cleanup passes). This module wires up the
//! subscriber: a non-blocking file layer plus a stdout layer, filtered via
//! the `RUST_LOG` environment variable. Entirely separate from the
//! application-facing [`crate::logger`] pipeline: these are the core's
//! own breadcrumbs, not device log output.

use std::fs;
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard will flush and close the diagnostics file writer.
pub struct DiagnosticsGuard {
    _file_guard: WorkerGuard,
}

/// Initialize the diagnostics subscriber.
///
/// Creates the directory if needed, clears the previous diagnostics file,
/// and sets up dual output to both file and stdout. Defaults to `info`
/// when `RUST_LOG` is unset.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the previous
/// file cannot be cleared. Calling this twice in one process fails inside
/// `tracing` (the global subscriber can only be set once); embedding
/// applications should call it exactly once at startup.
pub fn init(log_dir: &str, log_file: &str) -> Result<DiagnosticsGuard, io::Error> {
    fs::create_dir_all(log_dir)?;

    // Start each session with a fresh file.
    let log_path = Path::new(log_dir).join(log_file);
    fs::write(&log_path, "")?;

    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_ansi(true);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(DiagnosticsGuard {
        _file_guard: file_guard,
    })
}

/// Default diagnostics directory.
pub fn default_log_dir() -> &'static str {
    "logs"
}

/// Default diagnostics file name.
pub fn default_log_file() -> &'static str {
    "heapwarden.log"
}
