//! Small process-wide helpers.

pub mod logging;
pub mod outbox;
