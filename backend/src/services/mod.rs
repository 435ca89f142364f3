//! Module for core business logic services.
//!
//! These services sit between the HTTP handlers and the storage adapters:
//! account lookups with email verification, and credential management with
//! password recovery. Registration and login live in [`crate::auth::service`].

pub mod account;
pub mod credentials;

pub use account::AccountService;
pub use credentials::CredentialService;
