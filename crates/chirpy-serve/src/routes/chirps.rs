//! Chirp endpoints.
//!
//! Both `POST /api/validate_chirp` and `POST /api/chirps` run bodies through
//! [`chirpy_core::validate_chirp`]; they differ only in what happens after.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chirpy_core::ChirpError;
use chirpy_core::metrics::{self, CHIRPS_CREATED, CHIRPS_REJECTED};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::Chirp;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for `POST /api/validate_chirp`.
///
/// Absent fields decode to their zero value.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidateChirpRequest {
    #[serde(default)]
    pub body: String,
}

/// Response body for `POST /api/validate_chirp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateChirpResponse {
    pub cleaned_body: String,
}

/// Request body for `POST /api/chirps`.
///
/// A missing `user_id` decodes to the nil UUID, which matches no user and
/// fails at insert time.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateChirpRequest {
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub user_id: Uuid,
}

fn clean(body: &str) -> Result<String, ApiError> {
    chirpy_core::validate_chirp(body).map_err(|err| {
        match err {
            ChirpError::TooLong => metrics::increment_with_reason(CHIRPS_REJECTED, "too_long"),
        }
        ApiError::from(err)
    })
}

/// `POST /api/validate_chirp`
///
/// Validates a chirp and returns the cleaned body without storing anything.
pub async fn validate_chirp(payload: Bytes) -> Result<Json<ValidateChirpResponse>, ApiError> {
    let params: ValidateChirpRequest = serde_json::from_slice(&payload)?;
    let cleaned_body = clean(&params.body)?;

    Ok(Json(ValidateChirpResponse { cleaned_body }))
}

/// `POST /api/chirps`
///
/// Validates, cleans, and stores a chirp. Returns it with `201 Created`.
pub async fn create_chirp(
    State(state): State<AppState>,
    payload: Bytes,
) -> Result<(StatusCode, Json<Chirp>), ApiError> {
    let params: CreateChirpRequest = serde_json::from_slice(&payload)?;
    let body = clean(&params.body)?;

    let chirp = state
        .db
        .create_chirp(&body, params.user_id)
        .map_err(|e| ApiError::internal("Couldn't insert chirp", e))?;

    metrics::increment(CHIRPS_CREATED, 1);
    tracing::debug!(chirp_id = %chirp.id, user_id = %chirp.user_id, "chirp created");

    Ok((StatusCode::CREATED, Json(chirp)))
}

/// `GET /api/chirps`
///
/// Returns every chirp, oldest first.
pub async fn list_chirps(State(state): State<AppState>) -> Result<Json<Vec<Chirp>>, ApiError> {
    let chirps = state
        .db
        .get_chirps()
        .map_err(|e| ApiError::internal("Couldn't obtain chirps", e))?;

    Ok(Json(chirps))
}

/// `GET /api/chirps/{chirp_id}`
pub async fn get_chirp(
    State(state): State<AppState>,
    Path(chirp_id): Path<String>,
) -> Result<Json<Chirp>, ApiError> {
    let chirp_id =
        Uuid::parse_str(&chirp_id).map_err(|_| ApiError::BadRequest("Invalid ID".to_string()))?;

    let chirp = state
        .db
        .get_chirp_by_id(chirp_id)
        .map_err(|e| ApiError::internal("Couldn't obtain chirp", e))?
        .ok_or_else(|| ApiError::NotFound("Chirp ID not found".to_string()))?;

    Ok(Json(chirp))
}
