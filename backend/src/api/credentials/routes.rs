//! Defines the HTTP routes for credential endpoints.

use axum::routing::{patch, post};
use axum::Router;

use super::handlers::{request_password_recovery, update_password};
use crate::auth::{guard, AuthorizationPolicy, Permission};
use crate::state::AppState;

pub fn credentials_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/request-password-recovery", post(request_password_recovery))
        .route(
            "/update-password",
            guard(
                patch(update_password),
                state,
                AuthorizationPolicy::allow(&[Permission::Regular, Permission::RecoverPassword]),
            ),
        )
}
