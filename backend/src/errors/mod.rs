//! Global application error types and handlers.
//!
//! `AppError` is the error every service and handler returns. It wraps the
//! authentication and storage errors of the lower layers and renders itself
//! as a JSON `{"error": "..."}` body with the matching status code. Server-side
//! failures are logged and replaced by a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use keyward_adapters::AdapterError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::auth::AuthError;

pub const WRONG_CREDENTIALS: &str = "Incorrect username or password";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    DuplicateAccount(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{}", WRONG_CREDENTIALS)]
    WrongCredentials,
    #[error("Could not add the task to the queue")]
    QueueDelivery,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Storage(#[from] AdapterError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DuplicateAccount(_) | AppError::BadRequest(_) | AppError::WrongCredentials => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::QueueDelivery => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Auth(err) => err.status_code(),
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            AppError::Auth(err) if !err.is_client_error() => "Internal server error".to_string(),
            AppError::Storage(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}
