//! Structured logging setup with console and optional file output.
//!
//! Provides:
//! - Stdout logging, colourised only when attached to a terminal
//! - Daily rotating log files when a log directory is configured
//! - Console-only fallback when file logging fails
//! - Environment variable override via TABLESCOPE_LOG or RUST_LOG

use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Logging configuration.
pub struct LogConfig {
    /// Directory for log files; stdout only when absent
    pub log_dir: Option<PathBuf>,
    /// Whether stdout is a terminal (affects ANSI colouring)
    pub is_tty: bool,
}

impl LogConfig {
    /// Create a new logging configuration.
    pub fn new(log_dir: Option<PathBuf>) -> Self {
        Self { log_dir, is_tty: atty::is(atty::Stream::Stdout) }
    }
}

/// Guard that must be held for the lifetime of the process.
///
/// Dropping this guard flushes pending log entries.
pub struct LoggingGuard {
    _worker_guard: Option<WorkerGuard>,
}

/// Initialize logging with the given configuration.
///
/// If file logging initialization fails, falls back to console-only.
pub fn init_logging(config: LogConfig) -> LoggingGuard {
    let Some(log_dir) = config.log_dir.as_ref() else {
        return init_stdout_logging(config.is_tty);
    };

    match init_file_logging(log_dir) {
        Ok(guard) => LoggingGuard { _worker_guard: Some(guard) },
        Err(e) => {
            eprintln!("Warning: Failed to initialize file logging: {}. Using console only.", e);
            init_stdout_logging(config.is_tty)
        }
    }
}

/// Initialize stdout-only logging.
fn init_stdout_logging(ansi: bool) -> LoggingGuard {
    let env_filter = build_env_filter();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(ansi)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    LoggingGuard { _worker_guard: None }
}

/// Initialize file + console logging.
fn init_file_logging(log_dir: &Path) -> Result<WorkerGuard, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("tablescope")
        .filename_suffix("log")
        .build(log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Combine stdout and file output
    let stdout = std::io::stdout.with_max_level(tracing::Level::INFO);
    let combined = stdout.and(non_blocking);

    let env_filter = build_env_filter();

    // ANSI escapes would end up in the file too
    tracing_subscriber::fmt()
        .with_writer(combined)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    Ok(guard)
}

/// Build the environment filter from the environment or defaults.
fn build_env_filter() -> EnvFilter {
    // Priority: TABLESCOPE_LOG > RUST_LOG > default
    EnvFilter::try_from_env("TABLESCOPE_LOG")
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter()))
}

/// Get the default log filter based on build type.
pub fn default_log_filter() -> &'static str {
    #[cfg(debug_assertions)]
    {
        "debug,tablescope=trace,tablescope_core=trace,tokio_postgres=warn,hyper=warn"
    }
    #[cfg(not(debug_assertions))]
    {
        "info,tablescope=info,tablescope_core=info,tokio_postgres=warn,hyper=warn"
    }
}
