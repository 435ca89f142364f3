//! Credential endpoints: password recovery and password updates.

pub mod handlers;
pub mod routes;
