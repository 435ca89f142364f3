//! Core business logic for the authentication system.
//!
//! This service handles account registration, login and the "who am I"
//! lookup. It orchestrates the account and credential services with the
//! token service: a successful login is the only place regular tokens are
//! minted.

use std::sync::Arc;

use chrono::Utc;
use keyward_adapters::{Account, AdapterError, NewAccount, NewCredential};
use tracing::{debug, info};

use super::models::{LoginRequest, Permission, Principal, SignupRequest};
use super::token::TokenService;
use crate::errors::AppError;
use crate::services::account::AccountService;
use crate::services::credentials::CredentialService;

const EMAIL_TAKEN: &str = "There already exists an Account with the given email";
const USERNAME_TAKEN: &str = "There already exists an Account with the given username";

pub struct AuthService {
    accounts: Arc<AccountService>,
    credentials: Arc<CredentialService>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(
        accounts: Arc<AccountService>,
        credentials: Arc<CredentialService>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            accounts,
            credentials,
            tokens,
        }
    }

    pub async fn signup(&self, request: SignupRequest) -> Result<Account, AppError> {
        request.validate()?;
        let SignupRequest {
            username,
            email,
            password,
        } = request;

        if self
            .accounts
            .exists_by_email_or_username(&email, &username)
            .await?
        {
            let message = if self.accounts.find_by_email(&email).await?.is_some() {
                EMAIL_TAKEN
            } else {
                USERNAME_TAKEN
            };
            return Err(AppError::DuplicateAccount(message.to_string()));
        }

        let password_hash = self.credentials.hash_password(&password).await?;

        let account = self
            .accounts
            .create(NewAccount {
                username,
                email,
                registered_at: Utc::now(),
            })
            .await
            .map_err(|err| match err {
                AppError::Storage(AdapterError::Conflict(field)) if field == "email" => {
                    AppError::DuplicateAccount(EMAIL_TAKEN.to_string())
                }
                AppError::Storage(AdapterError::Conflict(_)) => {
                    AppError::DuplicateAccount(USERNAME_TAKEN.to_string())
                }
                other => other,
            })?;

        self.credentials
            .create(NewCredential {
                account_id: account.id,
                password_hash,
            })
            .await?;

        info!(account_id = %account.id, "Registered account");
        Ok(account)
    }

    /// Exchanges a username and password for a bearer token.
    ///
    /// Accounts that have not verified their email still log in, but their
    /// token also carries REQUEST_EMAIL_VERIFICATION.
    pub async fn login(&self, request: LoginRequest) -> Result<String, AppError> {
        request.validate()?;

        let Some(account) = self.accounts.find_by_username(&request.username).await? else {
            self.credentials.burn_verification(&request.password).await?;
            return Err(AppError::WrongCredentials);
        };

        let Some(credential) = self.credentials.find_by_account_id(account.id).await? else {
            return Err(AppError::NotFound("User credentials not found".to_string()));
        };

        if !self
            .credentials
            .verify_password(&request.password, &credential.password_hash)
            .await?
        {
            debug!(account_id = %account.id, "Login rejected");
            return Err(AppError::WrongCredentials);
        }

        let permissions: &[Permission] = if account.email_verified {
            &[Permission::Regular]
        } else {
            &[Permission::Regular, Permission::RequestEmailVerification]
        };
        Ok(self.tokens.issue(account.id, permissions).await?)
    }

    pub async fn who_am_i(&self, principal: &Principal) -> Result<Account, AppError> {
        self.accounts
            .find_by_id(principal.account_id)
            .await?
            .ok_or_else(|| AppError::NotFound("No account was found".to_string()))
    }
}
