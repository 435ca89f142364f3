//! Storage wiring.
//!
//! [`Repositories`] bundles the three record stores behind their adapter
//! traits so the rest of the backend never names a concrete backend.

use std::sync::Arc;

use keyward_adapters::{
    AccountRepository, CredentialRepository, InMemoryAccountRepository,
    InMemoryCredentialRepository, InMemoryTokenRepository, TokenRepository,
};

#[derive(Clone)]
pub struct Repositories {
    pub accounts: Arc<dyn AccountRepository>,
    pub credentials: Arc<dyn CredentialRepository>,
    pub tokens: Arc<dyn TokenRepository>,
}

impl Repositories {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        credentials: Arc<dyn CredentialRepository>,
        tokens: Arc<dyn TokenRepository>,
    ) -> Self {
        Self {
            accounts,
            credentials,
            tokens,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryAccountRepository::new()),
            Arc::new(InMemoryCredentialRepository::new()),
            Arc::new(InMemoryTokenRepository::new()),
        )
    }
}
