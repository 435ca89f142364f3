//! One-way password hashing.
//!
//! Hashes are Argon2id PHC strings with a random salt, so hashing the same
//! password twice yields different strings. Hashing is CPU bound: every call
//! runs on tokio's blocking pool and is admitted through a semaphore sized by
//! the configured worker count, so a burst of logins cannot starve the
//! runtime or oversubscribe the CPUs.

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use tokio::sync::Semaphore;
use zeroize::Zeroizing;

use super::errors::AuthError;
use crate::config::HashingConfig;

#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    workers: Arc<Semaphore>,
}

impl PasswordHasher {
    pub fn new(config: &HashingConfig) -> Result<Self, AuthError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|err| AuthError::Hashing(err.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            workers: Arc::new(Semaphore::new(config.workers.max(1))),
        })
    }

    pub async fn hash_password(&self, plaintext: &str) -> Result<String, AuthError> {
        let argon2 = self.argon2.clone();
        let plaintext = Zeroizing::new(plaintext.to_owned());
        self.run_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(plaintext.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|err| AuthError::Hashing(err.to_string()))
        })
        .await
    }

    /// Returns `Ok(false)` on a mismatch. A hash that cannot be parsed is an error.
    pub async fn verify_password(&self, plaintext: &str, hash: &str) -> Result<bool, AuthError> {
        let argon2 = self.argon2.clone();
        let plaintext = Zeroizing::new(plaintext.to_owned());
        let hash = hash.to_owned();
        self.run_blocking(move || {
            let parsed =
                PasswordHash::new(&hash).map_err(|err| AuthError::Hashing(err.to_string()))?;
            match argon2.verify_password(plaintext.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(password_hash::Error::Password) => Ok(false),
                Err(err) => Err(AuthError::Hashing(err.to_string())),
            }
        })
        .await
    }

    async fn run_blocking<T, F>(&self, work: F) -> Result<T, AuthError>
    where
        F: FnOnce() -> Result<T, AuthError> + Send + 'static,
        T: Send + 'static,
    {
        let permit = self
            .workers
            .clone()
            .acquire_owned()
            .await
            .map_err(|err| AuthError::Hashing(err.to_string()))?;

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            work()
        })
        .await
        .map_err(|err| AuthError::Hashing(err.to_string()))?
    }
}

#[cfg(test)]
pub(crate) fn test_hasher() -> PasswordHasher {
    PasswordHasher::new(&HashingConfig::for_tests()).expect("test hashing params are valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_is_not_plaintext() {
        let hasher = test_hasher();
        let hash = hasher.hash_password("secret").await.unwrap();
        assert_ne!(hash, "secret");
        assert!(hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_hash_is_salted() {
        let hasher = test_hasher();
        let first = hasher.hash_password("secret").await.unwrap();
        let second = hasher.hash_password("secret").await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_verify_password() {
        let hasher = test_hasher();
        let hash = hasher.hash_password("secret").await.unwrap();
        assert!(hasher.verify_password("secret", &hash).await.unwrap());
        assert!(!hasher.verify_password("wrong", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_rejects_malformed_hash() {
        let hasher = test_hasher();
        let err = hasher.verify_password("secret", "not-a-phc-string").await.unwrap_err();
        assert!(matches!(err, AuthError::Hashing(_)));
    }

    #[tokio::test]
    async fn test_concurrent_hashing_through_single_worker() {
        let hasher = PasswordHasher::new(&HashingConfig {
            workers: 1,
            ..HashingConfig::for_tests()
        })
        .unwrap();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let hasher = hasher.clone();
                tokio::spawn(async move { hasher.hash_password(&format!("password-{i}")).await })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }
    }
}
