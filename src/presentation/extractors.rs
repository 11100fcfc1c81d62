use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};

use crate::application::ports::RepositoryError;
use crate::infrastructure::persistence::DbSession;
use crate::presentation::state::AppState;

/// Rejection returned when a handler asks for a [`DbSession`] and none can be
/// acquired.
#[derive(Debug)]
pub struct SessionUnavailable(pub RepositoryError);

impl IntoResponse for SessionUnavailable {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "Database session unavailable");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}

impl FromRequestParts<AppState> for DbSession {
    type Rejection = SessionUnavailable;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        state.sessions.session().await.map_err(SessionUnavailable)
    }
}
