//! Generic data models for the `adapters` crate.
//!
//! These models define the plain records the repositories persist (accounts,
//! credentials, issued tokens) and the tasks handed to the queue. They carry no
//! behaviour beyond small helpers, so any repository implementation can store
//! them in whatever shape its backend prefers.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub email_verified: bool,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub registered_at: DateTime<Utc>,
}

/// Partial update for an [`Account`]. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
}

impl AccountPatch {
    pub fn apply(self, account: &mut Account) {
        if let Some(username) = self.username {
            account.username = username;
        }
        if let Some(email) = self.email {
            account.email = email;
        }
        if let Some(verified) = self.email_verified {
            account.email_verified = verified;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub id: Uuid,
    pub account_id: Uuid,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewCredential {
    pub account_id: Uuid,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default)]
pub struct CredentialPatch {
    pub password_hash: Option<String>,
}

impl CredentialPatch {
    pub fn apply(self, credential: &mut Credential) {
        if let Some(hash) = self.password_hash {
            credential.password_hash = hash;
        }
    }
}

/// Capability tag a token can be scoped to.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    Regular,
    RequestEmailVerification,
    VerifyEmail,
    RecoverPassword,
}

impl Permission {
    pub const ALL: [Permission; 4] = [
        Permission::Regular,
        Permission::RequestEmailVerification,
        Permission::VerifyEmail,
        Permission::RecoverPassword,
    ];

    /// Tokens carrying this permission are deleted after their first successful use.
    pub fn is_one_time_use(self) -> bool {
        matches!(self, Permission::VerifyEmail | Permission::RecoverPassword)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Permission::Regular => "REGULAR",
            Permission::RequestEmailVerification => "REQUEST_EMAIL_VERIFICATION",
            Permission::VerifyEmail => "VERIFY_EMAIL",
            Permission::RecoverPassword => "RECOVER_PASSWORD",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted token. `secret` holds the encrypted secret only; the plaintext
/// lives solely in the bearer string handed to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    pub id: Uuid,
    pub account_id: Uuid,
    pub secret: String,
    pub permissions: Vec<Permission>,
    pub is_one_time_use: bool,
    pub expiration_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTokenRecord {
    pub account_id: Uuid,
    pub secret: String,
    pub permissions: Vec<Permission>,
    pub is_one_time_use: bool,
    pub expiration_date: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    VerificationEmail,
    PasswordRecoveryEmail,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::VerificationEmail => f.write_str("VerificationEmail"),
            TaskKind::PasswordRecoveryEmail => f.write_str("PasswordRecoveryEmail"),
        }
    }
}
