//! Shared application state handed to every handler and middleware.

use std::sync::Arc;

use keyward_adapters::TaskQueue;

use crate::auth::password::PasswordHasher;
use crate::auth::revocation::RevocationManager;
use crate::auth::service::AuthService;
use crate::auth::token::TokenService;
use crate::auth::AuthError;
use crate::config::Config;
use crate::database::Repositories;
use crate::services::{AccountService, CredentialService};

#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub revocation: RevocationManager,
    pub auth: Arc<AuthService>,
    pub accounts: Arc<AccountService>,
    pub credentials: Arc<CredentialService>,
}

impl AppState {
    pub fn new(
        config: &Config,
        repositories: Repositories,
        queue: Arc<dyn TaskQueue>,
    ) -> Result<Self, AuthError> {
        let Repositories {
            accounts,
            credentials,
            tokens,
        } = repositories;

        let hasher = PasswordHasher::new(&config.hashing)?;
        let token_service = Arc::new(TokenService::new(
            tokens.clone(),
            &config.token_secret,
            config.lifetimes,
        ));
        let revocation = RevocationManager::new(tokens);

        let account_service = Arc::new(AccountService::new(
            accounts.clone(),
            token_service.clone(),
            queue.clone(),
        ));
        let credential_service = Arc::new(CredentialService::new(
            credentials,
            accounts,
            hasher,
            token_service.clone(),
            queue,
        ));
        let auth = Arc::new(AuthService::new(
            account_service.clone(),
            credential_service.clone(),
            token_service.clone(),
        ));

        Ok(Self {
            tokens: token_service,
            revocation,
            auth,
            accounts: account_service,
            credentials: credential_service,
        })
    }
}
