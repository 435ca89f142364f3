//! In-memory repository implementations.
//!
//! Each repository keeps its records behind a `tokio::sync::RwLock`, so every
//! write (including the conditional delete of a token) happens under a single
//! exclusive lock and is atomic with respect to concurrent callers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    Account, AccountPatch, AccountRepository, AdapterError, AdapterResult, Credential,
    CredentialPatch, CredentialRepository, NewAccount, NewCredential, NewTokenRecord,
    TokenRecord, TokenRepository,
};

#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountRepository {
    accounts: Arc<RwLock<HashMap<Uuid, Account>>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes an account. Used by tests to simulate a record vanishing
    /// between token issuance and use.
    pub async fn remove(&self, id: Uuid) -> Option<Account> {
        self.accounts.write().await.remove(&id)
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_id(&self, id: Uuid) -> AdapterResult<Option<Account>> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AdapterResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AdapterResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.username == username).cloned())
    }

    async fn create(&self, account: NewAccount) -> AdapterResult<Account> {
        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|a| a.email == account.email) {
            return Err(AdapterError::Conflict("email".to_string()));
        }
        if accounts.values().any(|a| a.username == account.username) {
            return Err(AdapterError::Conflict("username".to_string()));
        }

        let created = Account {
            id: Uuid::new_v4(),
            username: account.username,
            email: account.email,
            email_verified: false,
            registered_at: account.registered_at,
        };
        accounts.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_by_id(&self, id: Uuid, patch: AccountPatch) -> AdapterResult<Option<Account>> {
        let mut accounts = self.accounts.write().await;
        Ok(accounts.get_mut(&id).map(|account| {
            patch.apply(account);
            account.clone()
        }))
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialRepository {
    credentials: Arc<RwLock<HashMap<Uuid, Credential>>>,
}

impl InMemoryCredentialRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn remove_for_account(&self, account_id: Uuid) -> Option<Credential> {
        let mut credentials = self.credentials.write().await;
        let id = credentials
            .values()
            .find(|c| c.account_id == account_id)
            .map(|c| c.id)?;
        credentials.remove(&id)
    }
}

#[async_trait]
impl CredentialRepository for InMemoryCredentialRepository {
    async fn find_by_account_id(&self, account_id: Uuid) -> AdapterResult<Option<Credential>> {
        let credentials = self.credentials.read().await;
        Ok(credentials
            .values()
            .find(|c| c.account_id == account_id)
            .cloned())
    }

    async fn create(&self, credential: NewCredential) -> AdapterResult<Credential> {
        let mut credentials = self.credentials.write().await;
        if credentials
            .values()
            .any(|c| c.account_id == credential.account_id)
        {
            return Err(AdapterError::Conflict("account_id".to_string()));
        }

        let created = Credential {
            id: Uuid::new_v4(),
            account_id: credential.account_id,
            password_hash: credential.password_hash,
        };
        credentials.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        patch: CredentialPatch,
    ) -> AdapterResult<Option<Credential>> {
        let mut credentials = self.credentials.write().await;
        Ok(credentials.get_mut(&id).map(|credential| {
            patch.apply(credential);
            credential.clone()
        }))
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryTokenRepository {
    tokens: Arc<RwLock<HashMap<Uuid, TokenRecord>>>,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }

    /// Inserts a record as-is, keeping its id. Test fixture helper.
    pub async fn insert(&self, record: TokenRecord) {
        self.tokens.write().await.insert(record.id, record);
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn create(&self, token: NewTokenRecord) -> AdapterResult<TokenRecord> {
        let record = TokenRecord {
            id: Uuid::new_v4(),
            account_id: token.account_id,
            secret: token.secret,
            permissions: token.permissions,
            is_one_time_use: token.is_one_time_use,
            expiration_date: token.expiration_date,
        };
        self.tokens.write().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> AdapterResult<Option<TokenRecord>> {
        Ok(self.tokens.read().await.get(&id).cloned())
    }

    async fn delete_by_id(&self, id: Uuid) -> AdapterResult<bool> {
        Ok(self.tokens.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Permission;
    use chrono::Utc;

    fn new_account(username: &str, email: &str) -> NewAccount {
        NewAccount {
            username: username.to_string(),
            email: email.to_string(),
            registered_at: Utc::now(),
        }
    }

    fn new_token(account_id: Uuid) -> NewTokenRecord {
        NewTokenRecord {
            account_id,
            secret: "encrypted".to_string(),
            permissions: vec![Permission::VerifyEmail],
            is_one_time_use: true,
            expiration_date: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_account_lookups() {
        let repo = InMemoryAccountRepository::new();
        let created = repo.create(new_account("alice", "alice@example.com")).await.unwrap();
        assert!(!created.email_verified);

        let by_id = repo.find_by_id(created.id).await.unwrap();
        let by_email = repo.find_by_email("alice@example.com").await.unwrap();
        let by_username = repo.find_by_username("alice").await.unwrap();
        assert_eq!(by_id.as_ref(), Some(&created));
        assert_eq!(by_email.as_ref(), Some(&created));
        assert_eq!(by_username.as_ref(), Some(&created));

        assert!(repo.find_by_username("bob").await.unwrap().is_none());
        assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_account_create_rejects_duplicates() {
        let repo = InMemoryAccountRepository::new();
        repo.create(new_account("alice", "alice@example.com")).await.unwrap();

        let err = repo
            .create(new_account("other", "alice@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::Conflict(field) if field == "email"));

        let err = repo
            .create(new_account("alice", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::Conflict(field) if field == "username"));
    }

    #[tokio::test]
    async fn test_account_update_missing_returns_none() {
        let repo = InMemoryAccountRepository::new();
        let patch = AccountPatch {
            email_verified: Some(true),
            ..Default::default()
        };
        assert!(repo.update_by_id(Uuid::new_v4(), patch).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_credential_update() {
        let repo = InMemoryCredentialRepository::new();
        let account_id = Uuid::new_v4();
        let created = repo
            .create(NewCredential {
                account_id,
                password_hash: "old".to_string(),
            })
            .await
            .unwrap();

        let updated = repo
            .update_by_id(
                created.id,
                CredentialPatch {
                    password_hash: Some("new".to_string()),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.password_hash, "new");

        let found = repo.find_by_account_id(account_id).await.unwrap().unwrap();
        assert_eq!(found.password_hash, "new");
    }

    #[tokio::test]
    async fn test_token_delete_is_idempotent() {
        let repo = InMemoryTokenRepository::new();
        let record = repo.create(new_token(Uuid::new_v4())).await.unwrap();

        assert!(repo.delete_by_id(record.id).await.unwrap());
        assert!(!repo.delete_by_id(record.id).await.unwrap());
        assert!(repo.find_by_id(record.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_token_delete_removes_once() {
        let repo = InMemoryTokenRepository::new();
        let record = repo.create(new_token(Uuid::new_v4())).await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.delete_by_id(record.id).await.unwrap() })
            })
            .collect();

        let mut removed = 0;
        for handle in handles {
            if handle.await.unwrap() {
                removed += 1;
            }
        }
        assert_eq!(removed, 1);
        assert!(repo.is_empty().await);
    }
}
