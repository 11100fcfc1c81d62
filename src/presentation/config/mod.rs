mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{ENV_KEYS, LogFormat, Settings, SettingsError, get_settings, load_env_file};
