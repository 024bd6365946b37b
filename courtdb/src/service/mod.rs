//! Service layer: validation, transactional writes, cross-entity
//! operations, authentication, and read-only reports.
//!
//! Validation always runs and succeeds before a transaction opens; a
//! transaction either commits whole or rolls back whole.

pub mod auth;
pub mod ops;
pub mod reports;
pub mod stats;
pub mod validate;
