//! Defines the HTTP routes for account endpoints.

use axum::routing::{patch, post};
use axum::Router;

use super::handlers::{request_email_verification, verify_email};
use crate::auth::{guard, AuthorizationPolicy, Permission};
use crate::state::AppState;

pub fn account_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/request-email-verification",
            guard(
                post(request_email_verification),
                state,
                AuthorizationPolicy::allow(&[Permission::RequestEmailVerification]),
            ),
        )
        .route(
            "/verify-email",
            guard(
                patch(verify_email),
                state,
                AuthorizationPolicy::allow(&[Permission::VerifyEmail]),
            ),
        )
}
