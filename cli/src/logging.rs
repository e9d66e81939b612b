//! Logging initialization for the `ramify` binary.
//!
//! Stdout carries only command output, so logs go to stderr or to a file.
//!
//! - **RUST_LOG**: filter, e.g. `ramify=debug`. Default: `warn`, or `info` with `--verbose`.
//! - **--log-file PATH**: logs are appended to PATH (plain text, no ANSI) through a
//!   non-blocking `tracing-appender` writer instead of stderr.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "info,hyper_util=off"
    } else {
        "warn"
    }
}

/// Installs the global subscriber. Keep the returned guard alive until exit so buffered
/// file logs are flushed.
pub fn init(
    verbose: bool,
    log_file: Option<&Path>,
) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    match log_file {
        Some(path) => {
            let dir = match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p,
                _ => Path::new("."),
            };
            let name = path
                .file_name()
                .ok_or_else(|| format!("log file path has no file name: {}", path.display()))?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter);
            tracing_subscriber::registry().with(file_layer).try_init()?;
            tracing::info!(path = %path.display(), "ramify logging to file");
            Ok(Some(guard))
        }
        None => {
            let stderr_layer = tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(filter);
            tracing_subscriber::registry().with(stderr_layer).try_init()?;
            Ok(None)
        }
    }
}
