//! Issuance and verification of opaque bearer tokens.
//!
//! A bearer token is `"{record_id}-{secret}"` where both halves are hyphenated
//! UUIDs, giving ten dash-separated segments. The record id locates the
//! `TokenRecord`; the secret is stored only AES-256-GCM encrypted under a key
//! derived from the server secret, and is compared in constant time after
//! decryption.

use std::sync::Arc;

use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::Aes256Gcm;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{Duration, Utc};
use keyward_adapters::{NewTokenRecord, TokenRepository};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::errors::AuthError;
use super::models::{Permission, PermissionSet, Principal};

const SEGMENT_DELIMITER: char = '-';
const ID_SEGMENTS: usize = 5;
const TOKEN_SEGMENTS: usize = 10;
const NONCE_LEN: usize = 12;

/// How long a token lives, by the permission it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub regular: Duration,
    pub verify_email: Duration,
    pub recover_password: Duration,
}

impl TokenLifetimes {
    pub fn uniform(ttl: Duration) -> Self {
        Self {
            regular: ttl,
            verify_email: ttl,
            recover_password: ttl,
        }
    }

    pub fn ttl_for(&self, permissions: &PermissionSet) -> Duration {
        if permissions.contains(Permission::VerifyEmail) {
            self.verify_email
        } else if permissions.contains(Permission::RecoverPassword) {
            self.recover_password
        } else {
            self.regular
        }
    }
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self::uniform(Duration::hours(1))
    }
}

/// Symmetric encryption of token secrets at rest.
#[derive(Clone)]
pub struct SecretCipher {
    cipher: Aes256Gcm,
}

impl SecretCipher {
    pub fn new(server_secret: &str) -> Self {
        let key: [u8; 32] = Sha256::digest(server_secret.as_bytes()).into();
        Self {
            cipher: Aes256Gcm::new(&key.into()),
        }
    }

    /// Returns base64(nonce || ciphertext). A fresh nonce is drawn per call.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, AuthError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|err| AuthError::Crypto(err.to_string()))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(sealed))
    }

    pub fn decrypt(&self, sealed: &str) -> Result<Zeroizing<Vec<u8>>, AuthError> {
        let raw = STANDARD
            .decode(sealed)
            .map_err(|err| AuthError::Crypto(err.to_string()))?;
        if raw.len() <= NONCE_LEN {
            return Err(AuthError::Crypto("sealed secret is truncated".to_string()));
        }

        let (nonce, ciphertext) = raw.split_at(NONCE_LEN);
        self.cipher
            .decrypt(GenericArray::from_slice(nonce), ciphertext)
            .map(Zeroizing::new)
            .map_err(|err| AuthError::Crypto(err.to_string()))
    }
}

/// Splits a bearer string into its record id and plaintext secret.
///
/// Runs before any lookup; every malformed shape is reported as `InvalidToken`.
pub fn parse_bearer(token: &str) -> Result<(Uuid, &str), AuthError> {
    if token.split(SEGMENT_DELIMITER).count() != TOKEN_SEGMENTS {
        return Err(AuthError::InvalidToken);
    }

    let split_at = token
        .match_indices(SEGMENT_DELIMITER)
        .nth(ID_SEGMENTS - 1)
        .map(|(index, _)| index)
        .ok_or(AuthError::InvalidToken)?;
    let (id, secret) = (&token[..split_at], &token[split_at + 1..]);

    let parsed = Uuid::try_parse(id).map_err(|_| AuthError::InvalidToken)?;
    // one wire form per record: lowercase hyphenated, no braces or urn prefix
    if parsed.hyphenated().to_string() != id {
        return Err(AuthError::InvalidToken);
    }
    Ok((parsed, secret))
}

pub struct TokenService {
    tokens: Arc<dyn TokenRepository>,
    cipher: SecretCipher,
    lifetimes: TokenLifetimes,
}

impl TokenService {
    pub fn new(tokens: Arc<dyn TokenRepository>, server_secret: &str, lifetimes: TokenLifetimes) -> Self {
        Self {
            tokens,
            cipher: SecretCipher::new(server_secret),
            lifetimes,
        }
    }

    /// Mints a token for `account_id` scoped to `permissions` and returns the
    /// bearer string. The plaintext secret is not retained anywhere else.
    pub async fn issue(&self, account_id: Uuid, permissions: &[Permission]) -> Result<String, AuthError> {
        let permissions = PermissionSet::new(permissions.iter().copied())?;
        let ttl = self.lifetimes.ttl_for(&permissions);
        let is_one_time_use = permissions.is_one_time_use();

        let secret = Zeroizing::new(Uuid::new_v4().hyphenated().to_string());
        let record = self
            .tokens
            .create(NewTokenRecord {
                account_id,
                secret: self.cipher.encrypt(&secret)?,
                permissions: permissions.to_vec(),
                is_one_time_use,
                expiration_date: Utc::now() + ttl,
            })
            .await?;

        info!(
            account_id = %account_id,
            token_id = %record.id,
            permissions = %permissions,
            one_time_use = is_one_time_use,
            "Issued token"
        );
        Ok(format!("{}{}{}", record.id.hyphenated(), SEGMENT_DELIMITER, secret.as_str()))
    }

    /// Deletes the record behind a bearer this service issued but could not
    /// hand out.
    pub async fn discard(&self, token: &str) -> Result<(), AuthError> {
        let (id, _) = parse_bearer(token)?;
        self.tokens.delete_by_id(id).await?;
        debug!(token_id = %id, "Discarded undelivered token");
        Ok(())
    }

    pub async fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::NoTokenProvided);
        }

        let (id, secret) = parse_bearer(token)?;

        let Some(record) = self.tokens.find_by_id(id).await? else {
            warn!(token_id = %id, "Rejected token: no such record");
            return Err(AuthError::InvalidToken);
        };

        if record.expiration_date <= Utc::now() {
            warn!(token_id = %id, "Rejected token: expired");
            if self.tokens.delete_by_id(id).await? {
                debug!(token_id = %id, "Purged expired token");
            }
            return Err(AuthError::TokenExpired);
        }

        let stored = self.cipher.decrypt(&record.secret).map_err(|err| {
            error!(token_id = %id, "Stored token secret could not be decrypted: {}", err);
            err
        })?;
        if !bool::from(stored.as_slice().ct_eq(secret.as_bytes())) {
            warn!(token_id = %id, "Rejected token: secret mismatch");
            return Err(AuthError::InvalidToken);
        }

        let permissions = PermissionSet::new(record.permissions.iter().copied()).map_err(|err| {
            error!(token_id = %id, "Stored token has an invalid permission set: {}", err);
            AuthError::InvalidToken
        })?;

        debug!(token_id = %id, account_id = %record.account_id, "Verified token");
        Ok(Principal::new(
            record.account_id,
            permissions,
            record.is_one_time_use,
            record.id,
            token.to_string(),
        ))
    }
}
