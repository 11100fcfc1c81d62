mod database_settings;
mod db_session;
mod session_factory;

pub use database_settings::DatabaseSettings;
pub use db_session::DbSession;
pub use session_factory::SessionFactory;
