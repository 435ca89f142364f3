//! Handler functions for credential management.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::auth::Principal;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PasswordRecoveryRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    pub password: String,
}

pub async fn request_password_recovery(
    State(state): State<AppState>,
    Json(request): Json<PasswordRecoveryRequest>,
) -> Result<StatusCode, AppError> {
    state
        .credentials
        .request_password_recovery(&request.email)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Accepts a regular token or a one-time RECOVER_PASSWORD token; the latter
/// is consumed by the guard once this returns 204.
pub async fn update_password(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<UpdatePasswordRequest>,
) -> Result<StatusCode, AppError> {
    state
        .credentials
        .update_password(&principal, &request.password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
