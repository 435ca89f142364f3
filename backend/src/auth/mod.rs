//! Authentication module for accounts, bearer tokens, and access control.
//!
//! This module provides the token lifecycle (issue, verify, revoke), the
//! authorization engine, password hashing, and the registration and login
//! flows, together with the axum middleware and routes that expose them.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod policy;
pub mod revocation;
pub mod routes;
pub mod service;
pub mod token;

// Re-exports for convenience
pub use errors::AuthError;
pub use middleware::{extract_bearer, guard, Guard};
pub use models::{AuthorizationPolicy, Decision, Permission, PermissionSet, Principal};
pub use revocation::RevocationManager;
pub use routes::auth_router;
pub use service::AuthService;
pub use token::{TokenLifetimes, TokenService};
