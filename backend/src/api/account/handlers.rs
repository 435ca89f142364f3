//! Handler functions for the email verification flow.

use axum::extract::State;
use axum::http::StatusCode;

use crate::auth::Principal;
use crate::errors::AppError;
use crate::state::AppState;

pub async fn request_email_verification(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<StatusCode, AppError> {
    state.accounts.request_email_verification(&principal).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn verify_email(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<StatusCode, AppError> {
    state.accounts.verify_email(&principal).await?;
    Ok(StatusCode::NO_CONTENT)
}
