//! Error taxonomy for the store.
//!
//! Repositories and services return `anyhow::Result`; the typed errors
//! below are attached as the root cause so callers (and tests) can
//! `downcast` on the variant they care about. Validation failures are
//! raised before any transaction opens; transaction failures surface only
//! after the rollback has completed.

/// Result alias used throughout the repositories and services.
pub type StoreResult<T> = anyhow::Result<T>;

/// Errors raised by repository and service operations.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// The operation required an existing row (deleted or not) and found
    /// none.
    #[error("{entity} with id {id} not found")]
    NotFound {
        /// Entity kind, e.g. "team".
        entity: &'static str,
        /// The id that was looked up.
        id: i32,
    },

    /// A create collided with an existing id; deleted rows count.
    #[error("{entity} with id {id} already exists")]
    DuplicateId {
        /// Entity kind, e.g. "player".
        entity: &'static str,
        /// The colliding id.
        id: i32,
    },

    /// A hard delete was rejected because dependent rows still reference
    /// the target (only raised under
    /// [`crate::repo::player::HardDeletePolicy::RequireNoStatistics`]).
    #[error("{entity} with id {id} still has {count} dependent statistic row(s)")]
    DependentsExist {
        /// Entity kind.
        entity: &'static str,
        /// The id whose removal was rejected.
        id: i32,
        /// How many dependent rows exist, deleted included.
        count: i64,
    },

    /// A persistence failure inside an open transaction. The transaction
    /// has been rolled back by the time this surfaces.
    #[error("transaction failed: {context}")]
    Transaction {
        /// What the transaction was doing.
        context: String,
        /// The underlying store error.
        #[source]
        source: diesel::result::Error,
    },
}

/// Business-rule violations detected before a write is attempted.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Ids are caller-supplied positive integers.
    #[error("id must be a positive integer, got {0}")]
    NonPositiveId(i32),

    /// A statistic with this id already exists (deleted rows count).
    #[error("statistic with id {0} already exists")]
    DuplicateStatisticId(i32),

    /// The referenced match does not exist in any state.
    #[error("match with id {0} not found")]
    UnknownMatch(i32),

    /// The referenced player does not exist in any state.
    #[error("player with id {0} not found")]
    UnknownPlayer(i32),

    /// The player's team is neither side of the match. Overridable by an
    /// explicit operator decision, never silently.
    #[error(
        "player {player_id} (team {player_team_id}) is on neither side of \
         match {match_id} (teams {home_team_id} vs {away_team_id})"
    )]
    OffRoster {
        /// The player being recorded.
        player_id: i32,
        /// The team that player belongs to.
        player_team_id: i32,
        /// The match being recorded against.
        match_id: i32,
        /// Home side of the match.
        home_team_id: i32,
        /// Away side of the match.
        away_team_id: i32,
    },

    /// A statistic for this player/match pair already exists; soft-deleted
    /// duplicates still block.
    #[error("statistic for player {player_id} in match {match_id} already exists")]
    DuplicatePair {
        /// The player of the existing pair.
        player_id: i32,
        /// The match of the existing pair.
        match_id: i32,
    },

    /// An update targeted a statistic id with no row in any state.
    #[error("statistic with id {0} not found")]
    MissingStatistic(i32),

    /// The operator declined the confirmation prompt.
    #[error("operation cancelled by the operator")]
    Cancelled,

    /// A bulk write was handed an empty batch.
    #[error("statistics batch is empty")]
    EmptyBatch,
}
