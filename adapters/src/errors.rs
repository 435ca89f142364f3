//! Custom error types specific to the `adapters` crate.
//!
//! Absence of a record is never an error here: lookups return `Option`. These
//! variants cover a backend that failed to answer and writes rejected by a
//! uniqueness constraint.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Storage backend error: {0}")]
    Backend(String),
    #[error("Unique constraint violated: {0}")]
    Conflict(String),
}
