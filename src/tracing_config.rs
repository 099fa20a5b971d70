use std::{env, fs, path::Path};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{ConfwatchError, Result};

/// Environment variable selecting the log format ("pretty" or "json").
pub const LOG_FORMAT_ENV: &str = "CONFWATCH_LOG_FORMAT";

/// Output format of the console logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable, multi-line output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Reads the format from `CONFWATCH_LOG_FORMAT`, defaulting to pretty.
    pub fn from_env() -> Self {
        match env::var(LOG_FORMAT_ENV).as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize tracing for the application
///
/// Uses RUST_LOG if set, otherwise defaults to "info". Logs go to stderr so
/// that stdout carries only event output.
///
/// # Errors
/// Returns error if a global subscriber is already installed
pub fn init(format: LogFormat) -> Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter());

    match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    }
    .map_err(ConfwatchError::logging)
}

/// Initialize tracing with an additional daily rolling log file in `log_dir`
///
/// The returned guard flushes the file writer when dropped and must be kept
/// alive for as long as logs should be written.
///
/// # Errors
/// Returns error if the log directory or file cannot be created, or if a
/// global subscriber is already installed
pub fn init_with_file(format: LogFormat, log_dir: &Path) -> Result<WorkerGuard> {
    const DAYS_TO_KEEP: usize = 7;

    fs::create_dir_all(log_dir).map_err(|e| ConfwatchError::io(e, log_dir))?;

    let file_appender = tracing_appender::rolling::Builder::new()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .max_log_files(DAYS_TO_KEEP)
        .filename_prefix("confwatch")
        .filename_suffix("log")
        .build(log_dir)
        .map_err(ConfwatchError::logging)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let registry = tracing_subscriber::registry().with(env_filter());

    match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(non_blocking)
                    .with_ansi(false),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_writer(std::io::stderr),
            )
            .with(
                fmt::layer()
                    .compact()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(non_blocking)
                    .with_ansi(false),
            )
            .try_init(),
    }
    .map_err(ConfwatchError::logging)?;

    Ok(guard)
}
