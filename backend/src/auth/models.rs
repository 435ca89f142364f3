//! Data structures for authentication-related entities.
//!
//! This module defines the validated permission set a token is scoped to, the
//! principal resolved from a bearer token, the per-route authorization policy,
//! and the request/response bodies of the signup and login endpoints.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::AuthError;
use crate::errors::AppError;

pub use keyward_adapters::Permission;

/// The permissions a single token is scoped to: exactly one permission, or the
/// pair {REGULAR, REQUEST_EMAIL_VERIFICATION}.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    pub fn new<I>(permissions: I) -> Result<Self, AuthError>
    where
        I: IntoIterator<Item = Permission>,
    {
        let set: BTreeSet<Permission> = permissions.into_iter().collect();
        match set.len() {
            0 => Err(AuthError::PermissionsRequired),
            1 => Ok(Self(set)),
            2 if set.contains(&Permission::Regular)
                && set.contains(&Permission::RequestEmailVerification) =>
            {
                Ok(Self(set))
            }
            2 => Err(AuthError::IllegalCombination(Self(set).to_string())),
            _ => Err(AuthError::TooManyPermissions),
        }
    }

    pub fn single(permission: Permission) -> Self {
        Self(BTreeSet::from([permission]))
    }

    pub fn contains(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }

    pub fn intersects(&self, permissions: &[Permission]) -> bool {
        permissions.iter().any(|p| self.0.contains(p))
    }

    pub fn is_one_time_use(&self) -> bool {
        self.0.iter().any(|p| p.is_one_time_use())
    }

    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.0.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<Permission> {
        self.iter().collect()
    }
}

impl fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|p| p.as_str()).collect();
        f.write_str(&names.join(","))
    }
}

/// Identity and scope attached to a request after its bearer token verified.
#[derive(Clone, PartialEq, Eq)]
pub struct Principal {
    pub account_id: Uuid,
    pub permissions: PermissionSet,
    pub is_one_time_use: bool,
    pub token_id: Uuid,
    token: String,
}

impl Principal {
    pub(crate) fn new(
        account_id: Uuid,
        permissions: PermissionSet,
        is_one_time_use: bool,
        token_id: Uuid,
        token: String,
    ) -> Self {
        Self {
            account_id,
            permissions,
            is_one_time_use,
            token_id,
            token,
        }
    }

    /// The bearer string this principal was resolved from.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("account_id", &self.account_id)
            .field("permissions", &self.permissions)
            .field("is_one_time_use", &self.is_one_time_use)
            .field("token_id", &self.token_id)
            .finish_non_exhaustive()
    }
}

/// Allow/deny metadata attached to a protected endpoint.
///
/// `allowed_roles: None` admits any authenticated principal. A permission in
/// `denied_roles` always wins over the same permission in `allowed_roles`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationPolicy {
    pub allowed_roles: Option<Vec<Permission>>,
    pub denied_roles: Option<Vec<Permission>>,
}

impl AuthorizationPolicy {
    pub fn authenticated() -> Self {
        Self::default()
    }

    pub fn allow(roles: &[Permission]) -> Self {
        Self {
            allowed_roles: Some(roles.to_vec()),
            denied_roles: None,
        }
    }

    pub fn deny(roles: &[Permission]) -> Self {
        Self {
            allowed_roles: None,
            denied_roles: Some(roles.to_vec()),
        }
    }

    pub fn and_deny(mut self, roles: &[Permission]) -> Self {
        self.denied_roles = Some(roles.to_vec());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl SignupRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.username.trim().is_empty() {
            return Err(AppError::Validation("username must not be empty".to_string()));
        }
        if !is_email(&self.email) {
            return Err(AppError::Validation("email must be a valid address".to_string()));
        }
        validate_password(&self.password)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.username.trim().is_empty() {
            return Err(AppError::Validation("username must not be empty".to_string()));
        }
        validate_password(&self.password)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

fn is_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
