use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
}

pub async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    let settings = state.settings;
    (
        StatusCode::OK,
        Json(RootResponse {
            message: format!("{} backend running", settings.app_name),
            version: settings.app_version.clone(),
        }),
    )
}
