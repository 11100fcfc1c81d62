use crate::infrastructure::persistence::SessionFactory;
use crate::presentation::config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub settings: &'static Settings,
    pub sessions: SessionFactory,
}
