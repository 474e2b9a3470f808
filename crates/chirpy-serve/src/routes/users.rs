//! User endpoints.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use chirpy_core::metrics::{self, USERS_CREATED};
use serde::Deserialize;

use crate::db::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for `POST /api/users`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
}

/// `POST /api/users`
///
/// Creates a user and returns it with `201 Created`.
pub async fn create_user(
    State(state): State<AppState>,
    payload: Bytes,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let params: CreateUserRequest = serde_json::from_slice(&payload)?;

    let user = state
        .db
        .create_user(&params.email)
        .map_err(|e| ApiError::internal("Couldn't create user", e))?;

    metrics::increment(USERS_CREATED, 1);
    tracing::debug!(user_id = %user.id, "user created");

    Ok((StatusCode::CREATED, Json(user)))
}
