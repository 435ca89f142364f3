//! One-time-use token consumption.
//!
//! `RevocationManager::run` wraps an operation performed on behalf of a
//! verified principal. When the operation succeeds and the principal's token
//! is one-time-use, the backing record is deleted so the bearer string cannot
//! be replayed. A failed operation leaves the token usable for a retry.

use std::future::Future;
use std::sync::Arc;

use keyward_adapters::TokenRepository;
use tracing::{debug, info};

use super::errors::AuthError;
use super::models::Principal;

#[derive(Clone)]
pub struct RevocationManager {
    tokens: Arc<dyn TokenRepository>,
}

impl RevocationManager {
    pub fn new(tokens: Arc<dyn TokenRepository>) -> Self {
        Self { tokens }
    }

    /// Runs `operation` and consumes the principal's token if it succeeded.
    ///
    /// The operation's result is returned unchanged. A storage failure while
    /// deleting the token replaces a successful result, since the token would
    /// otherwise stay valid.
    pub async fn run<T, E, F>(&self, principal: &Principal, operation: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<AuthError>,
    {
        let result = operation.await;
        if result.is_ok() && principal.is_one_time_use {
            self.consume(principal).await.map_err(E::from)?;
        }
        result
    }

    /// Deletes the principal's token record.
    ///
    /// Returns `true` for the single caller that removed the record; racing
    /// callers and repeated calls observe `false`.
    pub async fn consume(&self, principal: &Principal) -> Result<bool, AuthError> {
        let removed = self.tokens.delete_by_id(principal.token_id).await?;
        if removed {
            info!(
                token_id = %principal.token_id,
                account_id = %principal.account_id,
                "Consumed one-time token"
            );
        } else {
            debug!(token_id = %principal.token_id, "One-time token was already consumed");
        }
        Ok(removed)
    }
}
