//! Account lookups and the email verification flow.
//!
//! Requesting verification mints a VERIFY_EMAIL token and hands it to the task
//! queue; presenting that token marks the email verified. The token is
//! one-time-use, so the boundary consumes it once `verify_email` succeeds.

use std::sync::Arc;

use keyward_adapters::{Account, AccountPatch, AccountRepository, NewAccount, TaskKind, TaskQueue};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::models::{Permission, Principal};
use crate::auth::token::TokenService;
use crate::errors::AppError;

const NO_ACCOUNT: &str = "No account was found";

pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    tokens: Arc<TokenService>,
    queue: Arc<dyn TaskQueue>,
}

impl AccountService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        tokens: Arc<TokenService>,
        queue: Arc<dyn TaskQueue>,
    ) -> Self {
        Self {
            accounts,
            tokens,
            queue,
        }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError> {
        Ok(self.accounts.find_by_id(id).await?)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        Ok(self.accounts.find_by_email(email).await?)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AppError> {
        Ok(self.accounts.find_by_username(username).await?)
    }

    pub async fn exists_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<bool, AppError> {
        Ok(self.accounts.find_by_email(email).await?.is_some()
            || self.accounts.find_by_username(username).await?.is_some())
    }

    pub async fn create(&self, account: NewAccount) -> Result<Account, AppError> {
        Ok(self.accounts.create(account).await?)
    }

    pub async fn mark_email_verified(&self, id: Uuid) -> Result<Account, AppError> {
        let patch = AccountPatch {
            email_verified: Some(true),
            ..Default::default()
        };
        self.accounts
            .update_by_id(id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound(NO_ACCOUNT.to_string()))
    }

    /// Issues a VERIFY_EMAIL token for the caller and enqueues its delivery.
    pub async fn request_email_verification(&self, principal: &Principal) -> Result<(), AppError> {
        let account = self
            .find_by_id(principal.account_id)
            .await?
            .ok_or_else(|| AppError::NotFound(NO_ACCOUNT.to_string()))?;
        if account.email_verified {
            return Err(AppError::BadRequest(
                "The email has already been verified".to_string(),
            ));
        }

        let token = self
            .tokens
            .issue(account.id, &[Permission::VerifyEmail])
            .await?;
        let payload = json!({
            "username": account.username,
            "email": account.email,
            "token": token,
        });
        if !self.queue.enqueue(TaskKind::VerificationEmail, payload).await {
            warn!(account_id = %account.id, "Could not enqueue verification email");
            self.tokens.discard(&token).await?;
            return Err(AppError::QueueDelivery);
        }

        info!(account_id = %account.id, "Requested email verification");
        Ok(())
    }

    pub async fn verify_email(&self, principal: &Principal) -> Result<Account, AppError> {
        let account = self.mark_email_verified(principal.account_id).await?;
        info!(account_id = %account.id, "Verified email");
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::SignupRequest;
    use crate::state::test_support::TestContext;
    use keyward_adapters::FailingTaskQueue;

    async fn signed_up(ctx: &TestContext) -> Account {
        ctx.state
            .auth
            .signup(SignupRequest {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap()
    }

    async fn principal_for(ctx: &TestContext, account: &Account, permissions: &[Permission]) -> Principal {
        let token = ctx.state.tokens.issue(account.id, permissions).await.unwrap();
        ctx.state.tokens.verify(&token).await.unwrap()
    }

    #[tokio::test]
    async fn test_exists_by_email_or_username() {
        let ctx = TestContext::new();
        signed_up(&ctx).await;
        let accounts = &ctx.state.accounts;

        assert!(accounts.exists_by_email_or_username("alice@example.com", "x").await.unwrap());
        assert!(accounts.exists_by_email_or_username("x@example.com", "alice").await.unwrap());
        assert!(!accounts.exists_by_email_or_username("x@example.com", "x").await.unwrap());
    }

    #[tokio::test]
    async fn test_request_email_verification_enqueues_usable_token() {
        let ctx = TestContext::new();
        let account = signed_up(&ctx).await;
        let principal = principal_for(
            &ctx,
            &account,
            &[Permission::Regular, Permission::RequestEmailVerification],
        )
        .await;

        ctx.state
            .accounts
            .request_email_verification(&principal)
            .await
            .unwrap();

        let tasks = ctx.queue.tasks().await;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].kind, TaskKind::VerificationEmail);
        assert_eq!(tasks[0].payload["email"], "alice@example.com");

        let token = tasks[0].payload["token"].as_str().unwrap();
        let verified = ctx.state.tokens.verify(token).await.unwrap();
        assert_eq!(verified.account_id, account.id);
        assert!(verified.is_one_time_use);
        assert!(verified.permissions.contains(Permission::VerifyEmail));
    }

    #[tokio::test]
    async fn test_request_email_verification_when_already_verified() {
        let ctx = TestContext::new();
        let account = signed_up(&ctx).await;
        ctx.state.accounts.mark_email_verified(account.id).await.unwrap();
        let principal = principal_for(&ctx, &account, &[Permission::RequestEmailVerification]).await;

        let err = ctx
            .state
            .accounts
            .request_email_verification(&principal)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(ctx.queue.tasks().await.is_empty());
    }

    #[tokio::test]
    async fn test_request_email_verification_for_missing_account() {
        let ctx = TestContext::new();
        let account = signed_up(&ctx).await;
        let principal = principal_for(&ctx, &account, &[Permission::RequestEmailVerification]).await;
        ctx.accounts.remove(account.id).await;

        let err = ctx
            .state
            .accounts
            .request_email_verification(&principal)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_request_email_verification_queue_failure() {
        let ctx = TestContext::with_queue(Arc::new(FailingTaskQueue));
        let account = signed_up(&ctx).await;
        let principal = principal_for(&ctx, &account, &[Permission::RequestEmailVerification]).await;

        let err = ctx
            .state
            .accounts
            .request_email_verification(&principal)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::QueueDelivery));
        assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);

        // only the caller's own token remains; the undelivered one is gone
        assert_eq!(ctx.tokens.len().await, 1);
        assert!(ctx.state.tokens.verify(principal.token()).await.is_ok());
    }

    #[tokio::test]
    async fn test_verify_email() {
        let ctx = TestContext::new();
        let account = signed_up(&ctx).await;
        let principal = principal_for(&ctx, &account, &[Permission::VerifyEmail]).await;

        let updated = ctx.state.accounts.verify_email(&principal).await.unwrap();
        assert!(updated.email_verified);

        ctx.accounts.remove(account.id).await;
        let err = ctx.state.accounts.verify_email(&principal).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
