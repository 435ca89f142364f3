//! Keyward: opaque bearer-token authentication for axum services.
//!
//! Accounts log in with a username and password and receive a
//! `"{record-id}-{secret}"` bearer token. The token's record carries the
//! permissions it grants; one-time-use tokens are consumed by the request
//! boundary after the first successful use.

pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod services;
pub mod state;
pub mod utils;

pub use api::create_router;
pub use config::Config;
pub use errors::AppError;
pub use state::AppState;
