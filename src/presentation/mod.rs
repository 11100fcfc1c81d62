pub mod config;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use config::{Environment, LogFormat, Settings, SettingsError, get_settings, load_env_file};
pub use extractors::SessionUnavailable;
pub use router::{cors_layer, create_router};
pub use server::{serve, shutdown_signal};
pub use state::AppState;
