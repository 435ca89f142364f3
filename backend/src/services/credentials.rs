//! Credential storage and the password recovery flow.
//!
//! This service owns the password hasher. Recovery mints a one-time
//! RECOVER_PASSWORD token and enqueues it for delivery; `update_password`
//! accepts either that token or a regular one.

use std::sync::Arc;

use keyward_adapters::{
    AccountRepository, Credential, CredentialPatch, CredentialRepository, NewCredential, TaskKind,
    TaskQueue,
};
use serde_json::json;
use tokio::sync::OnceCell;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::models::{validate_password, Permission, Principal};
use crate::auth::password::PasswordHasher;
use crate::auth::token::TokenService;
use crate::errors::AppError;

const DECOY_PASSWORD: &str = "keyward-decoy-password";

pub struct CredentialService {
    credentials: Arc<dyn CredentialRepository>,
    accounts: Arc<dyn AccountRepository>,
    hasher: PasswordHasher,
    tokens: Arc<TokenService>,
    queue: Arc<dyn TaskQueue>,
    decoy_hash: OnceCell<String>,
}

impl CredentialService {
    pub fn new(
        credentials: Arc<dyn CredentialRepository>,
        accounts: Arc<dyn AccountRepository>,
        hasher: PasswordHasher,
        tokens: Arc<TokenService>,
        queue: Arc<dyn TaskQueue>,
    ) -> Self {
        Self {
            credentials,
            accounts,
            hasher,
            tokens,
            queue,
            decoy_hash: OnceCell::new(),
        }
    }

    pub async fn hash_password(&self, password: &str) -> Result<String, AppError> {
        Ok(self.hasher.hash_password(password).await?)
    }

    pub async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        Ok(self.hasher.verify_password(password, hash).await?)
    }

    /// Spends one verification's worth of work against a fixed hash, so a
    /// login for an unknown username costs as much as a wrong password.
    pub async fn burn_verification(&self, password: &str) -> Result<(), AppError> {
        let decoy = self
            .decoy_hash
            .get_or_try_init(|| self.hasher.hash_password(DECOY_PASSWORD))
            .await?;
        self.hasher.verify_password(password, decoy).await?;
        Ok(())
    }

    pub async fn find_by_account_id(&self, account_id: Uuid) -> Result<Option<Credential>, AppError> {
        Ok(self.credentials.find_by_account_id(account_id).await?)
    }

    pub async fn create(&self, credential: NewCredential) -> Result<Credential, AppError> {
        Ok(self.credentials.create(credential).await?)
    }

    pub async fn update_by_id(
        &self,
        id: Uuid,
        patch: CredentialPatch,
    ) -> Result<Option<Credential>, AppError> {
        Ok(self.credentials.update_by_id(id, patch).await?)
    }

    /// Issues a RECOVER_PASSWORD token for the account owning `email` and
    /// enqueues its delivery.
    pub async fn request_password_recovery(&self, email: &str) -> Result<(), AppError> {
        let account = self.accounts.find_by_email(email).await?.ok_or_else(|| {
            AppError::NotFound("There is not an account registered with the given email".to_string())
        })?;

        let token = self
            .tokens
            .issue(account.id, &[Permission::RecoverPassword])
            .await?;
        let payload = json!({
            "username": account.username,
            "email": account.email,
            "token": token,
        });
        if !self.queue.enqueue(TaskKind::PasswordRecoveryEmail, payload).await {
            warn!(account_id = %account.id, "Could not enqueue password recovery email");
            self.tokens.discard(&token).await?;
            return Err(AppError::QueueDelivery);
        }

        info!(account_id = %account.id, "Requested password recovery");
        Ok(())
    }

    pub async fn update_password(&self, principal: &Principal, password: &str) -> Result<(), AppError> {
        validate_password(password)?;

        let credential = self
            .find_by_account_id(principal.account_id)
            .await?
            .ok_or_else(|| AppError::NotFound("The account credentials were not found".to_string()))?;

        if self.verify_password(password, &credential.password_hash).await? {
            return Err(AppError::BadRequest(
                "The new password can not be equal to current password".to_string(),
            ));
        }

        let patch = CredentialPatch {
            password_hash: Some(self.hash_password(password).await?),
        };
        self.update_by_id(credential.id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound("The account credentials were not found".to_string()))?;

        info!(account_id = %principal.account_id, "Updated password");
        Ok(())
    }
}
