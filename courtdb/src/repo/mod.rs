//! Soft-delete-aware repositories, one module per aggregate root.
//!
//! Every module exposes the same surface: `list`, `get_by_id`, `create`,
//! `update`, `delete`, `restore`, `list_deleted` (plus `hard_delete` for
//! players). Default reads exclude soft-deleted rows; the `*_deleted`
//! listings and the id-collision checks bypass the filter. Cascades
//! (team -> players + coaches, match -> statistics, player -> statistics)
//! run inside a single diesel transaction.

pub mod coach;
pub mod matches;
pub mod player;
pub mod statistic;
pub mod team;

/// Which side of the soft-delete filter a read should see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Rows with `deleted = false` (the default read path).
    Active,
    /// Rows with `deleted = true` (the administrative read path).
    Deleted,
}

impl Visibility {
    /// The `deleted` column value this visibility selects.
    pub fn deleted(self) -> bool {
        matches!(self, Visibility::Deleted)
    }
}
