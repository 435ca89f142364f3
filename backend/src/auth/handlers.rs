//! Handler functions for authentication-related API endpoints.
//!
//! Registration and login are public. `who_am_i` runs behind the guard and
//! receives the resolved [`Principal`].

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use keyward_adapters::Account;

use super::models::{LoginRequest, Principal, SignupRequest, TokenResponse};
use crate::errors::AppError;
use crate::state::AppState;

pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<Account>), AppError> {
    let account = state.auth.signup(request).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let token = state.auth.login(request).await?;
    Ok(Json(TokenResponse { token }))
}

pub async fn who_am_i(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<Account>, AppError> {
    Ok(Json(state.auth.who_am_i(&principal).await?))
}
