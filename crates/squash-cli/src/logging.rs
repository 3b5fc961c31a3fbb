use std::env;
use std::path::Path;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILE: &str = "./logs/squash.log";

/// Stdout gets a compact colored stream; the log file gets every event
/// without ANSI codes so failed paths can be grepped after a long batch.
///
/// `TRACING_LEVEL` takes an `EnvFilter` directive (default `info`),
/// `LOG_FILE_PATH` the log file location. The returned guard must be held
/// until exit or buffered file lines are lost.
pub fn init_logger() -> WorkerGuard {
    let directive = env::var("TRACING_LEVEL").unwrap_or_else(|_| "info".to_string());
    let (filter_layer, bad_directive) = match EnvFilter::try_new(&directive) {
        Ok(filter) => (filter, false),
        Err(_) => (EnvFilter::new("info"), true),
    };

    let log_file_path = env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let log_file_path = Path::new(&log_file_path);
    let log_dir = log_file_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let log_file_name = log_file_path
        .file_name()
        .map(|f| f.to_os_string())
        .unwrap_or_else(|| "squash.log".into());

    let file_appender = tracing_appender::rolling::never(log_dir, log_file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .compact()
                .with_target(false)
                .without_time()
                .with_ansi(true),
        )
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_thread_names(true)
                .with_ansi(false),
        )
        .with(filter_layer)
        .init();

    if bad_directive {
        warn!("Ignoring invalid TRACING_LEVEL '{}', using info", directive);
    }
    info!("Logging to {}", log_file_path.display());

    guard
}
