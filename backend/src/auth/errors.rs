//! Custom error types specific to authentication failures.
//!
//! Token verification failures collapse into `InvalidToken` whether the bearer
//! string was malformed, named an unknown record or carried the wrong secret.
//! Expiry is reported separately. Permission-set violations at issuance are
//! programming errors and map to a 500.

use axum::http::StatusCode;
use keyward_adapters::AdapterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Error verifying the token: No token was provided")]
    NoTokenProvided,
    #[error("Error verifying the token: Invalid Token")]
    InvalidToken,
    #[error("Error verifying the token: Token has expired")]
    TokenExpired,
    #[error("Access denied: insufficient permissions")]
    PermissionDenied,
    #[error("Permissions array must contain at least 1 permission")]
    PermissionsRequired,
    #[error("Permissions array can not contain more than 2 permissions")]
    TooManyPermissions,
    #[error("Combination of permissions are not allowed: {0}")]
    IllegalCombination(String),
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error("Token secret encryption failed: {0}")]
    Crypto(String),
    #[error(transparent)]
    Storage(#[from] AdapterError),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::NoTokenProvided | AuthError::InvalidToken | AuthError::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::PermissionDenied => StatusCode::FORBIDDEN,
            AuthError::PermissionsRequired
            | AuthError::TooManyPermissions
            | AuthError::IllegalCombination(_)
            | AuthError::Hashing(_)
            | AuthError::Crypto(_)
            | AuthError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the message is safe to show to the caller as-is.
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}
