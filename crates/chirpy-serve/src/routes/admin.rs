//! Admin endpoints: hit metrics and state reset.

use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse};

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /admin/metrics`
///
/// Renders the file server hit count as a small HTML page.
pub async fn metrics(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<html><body><h1>Welcome, Chirpy Admin</h1><p>Chirpy has been visited {} times!</p></body></html>",
        state.hits.get()
    ))
}

/// `POST /admin/reset`
///
/// Zeroes the hit counter and deletes every user (and with them every
/// chirp). Only allowed when the platform is `dev`.
pub async fn reset(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    if !state.config.is_dev() {
        tracing::warn!(platform = %state.config.platform, "reset refused outside dev");
        return Err(ApiError::Forbidden(
            "Reset is only allowed in dev environment.".to_string(),
        ));
    }

    state.hits.reset();
    let deleted = state
        .db
        .delete_all_users()
        .map_err(|e| ApiError::internal("Failed to reset the database", e))?;

    tracing::info!(deleted_users = deleted, "state reset");

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "Hits reset to 0 and database reset to initial state.",
    ))
}
