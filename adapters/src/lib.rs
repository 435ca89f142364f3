//! Core `adapters` crate for abstracting the collaborators of the token service.
//!
//! This crate defines the narrow repository traits the backend persists through
//! (`AccountRepository`, `CredentialRepository`, `TokenRepository`) and the
//! `TaskQueue` trait used to hand e-mail jobs to workers. In-memory
//! implementations of all four live in [`memory`] and [`queue`].

pub mod errors;
pub mod memory;
pub mod models;
pub mod queue;

use async_trait::async_trait;
use uuid::Uuid;

pub use errors::AdapterError;
pub use memory::{InMemoryAccountRepository, InMemoryCredentialRepository, InMemoryTokenRepository};
pub use models::*;
pub use queue::{FailingTaskQueue, InMemoryTaskQueue, QueuedTask};

pub type AdapterResult<T> = Result<T, AdapterError>;

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AdapterResult<Option<Account>>;
    async fn find_by_email(&self, email: &str) -> AdapterResult<Option<Account>>;
    async fn find_by_username(&self, username: &str) -> AdapterResult<Option<Account>>;
    /// Fails with [`AdapterError::Conflict`] when the username or email is taken.
    async fn create(&self, account: NewAccount) -> AdapterResult<Account>;
    /// Returns the patched account, or `None` if no account has this id.
    async fn update_by_id(&self, id: Uuid, patch: AccountPatch) -> AdapterResult<Option<Account>>;
}

#[async_trait]
pub trait CredentialRepository: Send + Sync {
    async fn find_by_account_id(&self, account_id: Uuid) -> AdapterResult<Option<Credential>>;
    async fn create(&self, credential: NewCredential) -> AdapterResult<Credential>;
    async fn update_by_id(
        &self,
        id: Uuid,
        patch: CredentialPatch,
    ) -> AdapterResult<Option<Credential>>;
}

#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn create(&self, token: NewTokenRecord) -> AdapterResult<TokenRecord>;
    async fn find_by_id(&self, id: Uuid) -> AdapterResult<Option<TokenRecord>>;
    /// Deletes the record if it exists. Returns `true` only for the call that
    /// actually removed it; deleting an absent record is not an error.
    async fn delete_by_id(&self, id: Uuid) -> AdapterResult<bool>;
}

#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Returns `false` when the task could not be delivered. No retries.
    async fn enqueue(&self, kind: TaskKind, payload: serde_json::Value) -> bool;
}
