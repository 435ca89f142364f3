//! Defines the HTTP routes specifically for authentication.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{login, signup, who_am_i};
use super::middleware::guard;
use super::models::{AuthorizationPolicy, Permission};
use crate::state::AppState;

pub fn auth_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/sign-up", post(signup))
        .route("/login", post(login))
        .route(
            "/who-am-i",
            guard(
                get(who_am_i),
                state,
                AuthorizationPolicy::deny(&[Permission::RecoverPassword, Permission::VerifyEmail]),
            ),
        )
}
