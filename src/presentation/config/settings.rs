use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use config::{Config, ConfigError, File};
use serde::Deserialize;

use super::Environment;
use crate::infrastructure::observability::TracingConfig;
use crate::infrastructure::persistence::DatabaseSettings;

/// Environment variables read into [`Settings`]. Matching is case-sensitive.
pub const ENV_KEYS: &[&str] = &[
    "APP_NAME",
    "APP_VERSION",
    "DEBUG",
    "DATABASE_URL",
    "SECRET_KEY",
    "ALGORITHM",
    "ACCESS_TOKEN_EXPIRE_MINUTES",
    "CORS_ORIGINS",
    "QDRANT_URL",
    "OPENAI_API_KEY",
    "CLAUDE_API_KEY",
    "OLLAMA_URL",
    "APP_ENV",
    "SERVER_HOST",
    "SERVER_PORT",
    "DATABASE_MAX_CONNECTIONS",
    "DATABASE_ACQUIRE_TIMEOUT_SECS",
    "LOG_DIR",
    "LOG_FORMAT",
    "LOG_RETENTION_DAYS",
];

const SETTINGS_FILE: &str = "appsettings";
const ENV_FILE: &str = ".env";
const LOG_FILE_PREFIX: &str = "yavin1";
const REDACTED: &str = "[REDACTED]";

static SETTINGS: OnceLock<Settings> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("{0}")]
    InvalidEnvironment(String),
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ConfigError),
    #[error("failed to read env file: {0}")]
    EnvFile(#[from] dotenvy::Error),
}

/// `CORS_ORIGINS` arrives as a list from defaults and settings files, and as
/// a string from the environment: either comma-separated or a JSON array.
#[derive(Deserialize)]
#[serde(untagged)]
enum OriginList {
    List(Vec<String>),
    Raw(String),
}

fn deserialize_origins<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let origins = match OriginList::deserialize(deserializer)? {
        OriginList::List(origins) => origins,
        OriginList::Raw(raw) if raw.trim_start().starts_with('[') => {
            serde_json::from_str(&raw).map_err(serde::de::Error::custom)?
        }
        OriginList::Raw(raw) => raw.split(',').map(str::to_string).collect(),
    };

    Ok(origins
        .into_iter()
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect())
}

/// Loads variables from an env file into the process environment without
/// overriding variables that are already set. A missing file is not an
/// error; returns whether one was read.
pub fn load_env_file(path: &Path) -> Result<bool, SettingsError> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(SettingsError::EnvFile(e)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Deserialize)]
pub struct Settings {
    // App
    pub app_name: String,
    pub app_version: String,
    pub debug: bool,
    pub app_env: Environment,

    // Server
    pub server_host: String,
    pub server_port: u16,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,
    pub database_acquire_timeout_secs: u64,

    // Security
    pub secret_key: String,
    pub algorithm: String,
    pub access_token_expire_minutes: u32,

    // CORS
    #[serde(deserialize_with = "deserialize_origins")]
    pub cors_origins: Vec<String>,

    // Vector store
    pub qdrant_url: String,

    // LLM providers
    pub openai_api_key: String,
    pub claude_api_key: String,
    pub ollama_url: String,

    // Logging
    pub log_dir: PathBuf,
    pub log_format: LogFormat,
    pub log_retention_days: u32,
}

/// Returns the process-wide settings, loading them on first call.
///
/// Every successful call returns the same instance. A failed load is not
/// cached.
pub fn get_settings() -> Result<&'static Settings, SettingsError> {
    if let Some(settings) = SETTINGS.get() {
        return Ok(settings);
    }

    let loaded = Settings::load()?;
    Ok(SETTINGS.get_or_init(|| loaded))
}

impl Settings {
    /// Loads `.env`, then the settings files in the working directory, then
    /// the process environment.
    pub fn load() -> Result<Self, SettingsError> {
        load_env_file(Path::new(ENV_FILE))?;

        let vars = std::env::vars()
            .filter(|(key, _)| ENV_KEYS.contains(&key.as_str()))
            .collect();

        Self::from_env_map(vars, Path::new("."))
    }

    /// Builds settings from defaults, the optional `appsettings` and
    /// `appsettings.<env>` files in `config_dir`, and `vars`, in increasing
    /// order of precedence.
    pub fn from_env_map(
        vars: HashMap<String, String>,
        config_dir: &Path,
    ) -> Result<Self, SettingsError> {
        let environment = match vars.get("APP_ENV") {
            Some(raw) => {
                Environment::try_from(raw.clone()).map_err(SettingsError::InvalidEnvironment)?
            }
            None => Environment::Local,
        };

        let vars = vars
            .into_iter()
            .filter(|(key, _)| ENV_KEYS.contains(&key.as_str()))
            .collect();

        let base_file = config_dir.join(SETTINGS_FILE);
        let env_file = config_dir.join(format!(
            "{SETTINGS_FILE}.{}",
            environment.settings_file_suffix()
        ));

        let configuration = Config::builder()
            .set_default("app_name", "YAVIN 1 Backend API")?
            .set_default("app_version", "0.1.0")?
            .set_default("debug", true)?
            .set_default("server_host", "0.0.0.0")?
            .set_default("server_port", 8000)?
            .set_default(
                "database_url",
                "postgresql://postgres:postgres@db:5432/yavin1_db",
            )?
            .set_default("database_max_connections", 10)?
            .set_default("database_acquire_timeout_secs", 30)?
            .set_default("secret_key", "change-me-in-production")?
            .set_default("algorithm", "HS256")?
            .set_default("access_token_expire_minutes", 30)?
            .set_default(
                "cors_origins",
                vec!["http://localhost:5173", "http://localhost:3000"],
            )?
            .set_default("qdrant_url", "http://qdrant:6333")?
            .set_default("openai_api_key", "")?
            .set_default("claude_api_key", "")?
            .set_default("ollama_url", "")?
            .set_default("log_dir", "logs")?
            .set_default("log_format", "text")?
            .set_default("log_retention_days", 10)?
            .add_source(File::with_name(&base_file.to_string_lossy()).required(false))
            .add_source(File::with_name(&env_file.to_string_lossy()).required(false))
            .add_source(config::Environment::default().source(Some(vars)))
            .set_override("app_env", environment.as_str())?
            .build()?;

        Ok(configuration.try_deserialize()?)
    }

    pub fn database(&self) -> DatabaseSettings {
        DatabaseSettings {
            url: self.database_url.clone(),
            max_connections: self.database_max_connections,
            acquire_timeout: Duration::from_secs(self.database_acquire_timeout_secs),
            log_statements: self.debug,
        }
    }

    pub fn tracing(&self) -> TracingConfig {
        let console_level = if self.debug { "debug" } else { "info" };

        TracingConfig {
            environment: self.app_env.to_string(),
            json_format: self.log_format == LogFormat::Json,
            console_level: console_level.to_string(),
            file_level: "info".to_string(),
            log_dir: self.log_dir.clone(),
            file_prefix: LOG_FILE_PREFIX.to_string(),
            retention_days: self.log_retention_days,
        }
    }
}

fn redact(value: &str) -> &str {
    if value.is_empty() { value } else { REDACTED }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("app_name", &self.app_name)
            .field("app_version", &self.app_version)
            .field("debug", &self.debug)
            .field("app_env", &self.app_env)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("database_url", &REDACTED)
            .field("database_max_connections", &self.database_max_connections)
            .field(
                "database_acquire_timeout_secs",
                &self.database_acquire_timeout_secs,
            )
            .field("secret_key", &redact(&self.secret_key))
            .field("algorithm", &self.algorithm)
            .field(
                "access_token_expire_minutes",
                &self.access_token_expire_minutes,
            )
            .field("cors_origins", &self.cors_origins)
            .field("qdrant_url", &self.qdrant_url)
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("claude_api_key", &redact(&self.claude_api_key))
            .field("ollama_url", &self.ollama_url)
            .field("log_dir", &self.log_dir)
            .field("log_format", &self.log_format)
            .field("log_retention_days", &self.log_retention_days)
            .finish()
    }
}
