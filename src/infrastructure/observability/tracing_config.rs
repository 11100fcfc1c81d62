use std::path::PathBuf;

pub const LOG_FILE_SUFFIX: &str = "log";

/// Configuration for tracing initialization.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
    /// Filter directive for the console layer, overridden by `RUST_LOG`.
    pub console_level: String,
    pub file_level: String,
    pub log_dir: PathBuf,
    pub file_prefix: String,
    pub retention_days: u32,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            environment: "Local".to_string(),
            json_format: false,
            console_level: "info".to_string(),
            file_level: "info".to_string(),
            log_dir: PathBuf::from("logs"),
            file_prefix: "yavin1".to_string(),
            retention_days: 10,
        }
    }
}
