mod repository_error;
mod session_provider;

pub use repository_error::RepositoryError;
pub use session_provider::{SessionProvider, with_scoped_session};
