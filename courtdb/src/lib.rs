//! Soft-delete-aware data core for a league statistics console.
//!
//! The store keeps teams, players, coaches, matches, and per-player
//! per-match stat lines in SQLite. Parent deletes cascade to dependents
//! (team -> players + coaches, match -> statistics, player -> statistics)
//! and restores reverse them, always inside one transaction. Default
//! reads hide soft-deleted rows; administrative reads see them.

pub mod db;
pub mod error;
pub mod models;
pub mod repo;
pub mod schema;
pub mod service;
