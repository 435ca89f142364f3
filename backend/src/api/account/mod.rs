//! Account endpoints: requesting and completing email verification.

pub mod handlers;
pub mod routes;
