mod health;
mod root;

pub use health::{HealthResponse, health_handler};
pub use root::{RootResponse, root_handler};
