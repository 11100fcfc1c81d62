use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, Registry, filter::ParseError, fmt};

use super::{LOG_FILE_SUFFIX, TracingConfig};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, thiserror::Error)]
pub enum TracingInitError {
    #[error("failed to create log directory {path}: {source}")]
    LogDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to open rolling log file: {0}")]
    Appender(#[from] InitError),
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),
    #[error("tracing already initialized: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

/// Keeps the non-blocking file writer flushing. Drop it only at process exit.
#[must_use = "dropping the guard stops the file log writer"]
pub struct TracingGuard {
    _file_writer: WorkerGuard,
}

/// Initialize the tracing subscriber: a console layer plus a daily-rotated
/// file layer under `config.log_dir`.
pub fn init_tracing(config: &TracingConfig) -> Result<TracingGuard, TracingInitError> {
    std::fs::create_dir_all(&config.log_dir).map_err(|source| TracingInitError::LogDirectory {
        path: config.log_dir.clone(),
        source,
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(&config.file_prefix)
        .filename_suffix(LOG_FILE_SUFFIX)
        .build(&config.log_dir)?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let console_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.console_level)?,
    };
    let file_filter = EnvFilter::try_new(&config.file_level)?;

    let timer = ChronoLocal::new(TIMESTAMP_FORMAT.to_string());

    let console: Box<dyn Layer<Registry> + Send + Sync> = if config.json_format {
        fmt::layer()
            .json()
            .with_timer(timer.clone())
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .with_timer(timer.clone())
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    let file = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_timer(timer)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(file_filter);

    tracing_subscriber::registry()
        .with(console.with_filter(console_filter))
        .with(file)
        .try_init()?;

    tracing::info!(
        environment = %config.environment,
        json_format = config.json_format,
        log_dir = %config.log_dir.display(),
        "Tracing initialized"
    );

    Ok(TracingGuard {
        _file_writer: guard,
    })
}
