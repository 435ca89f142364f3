//! Central module for organizing the application's API endpoints.
//!
//! Authentication routes come from [`crate::auth::routes`]; the account and
//! credential flows are mounted under `/accounts` and `/credentials`.

pub mod account;
pub mod credentials;

use axum::routing::get;
use axum::Router;

use crate::auth::auth_router;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .merge(auth_router(&state))
        .nest("/accounts", account::routes::account_router(&state))
        .nest("/credentials", credentials::routes::credentials_router(&state))
        .with_state(state)
}

async fn root_handler() -> &'static str {
    "Welcome to Keyward!"
}
