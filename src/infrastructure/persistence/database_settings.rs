use std::time::Duration;

/// Connection parameters for the Postgres session factory.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    /// Emit executed statements through `tracing` (mirrors the `DEBUG` flag).
    pub log_statements: bool,
}
