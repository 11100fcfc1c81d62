mod init_tracing;
mod log_archiver;
mod tracing_config;

pub use init_tracing::{TracingGuard, TracingInitError, init_tracing};
pub use log_archiver::{ArchiveReport, LogArchiver};
pub use tracing_config::{LOG_FILE_SUFFIX, TracingConfig};
