//! Pre-write validation for new stat lines.
//!
//! Checks run in a fixed order and short-circuit on the first failure.
//! Every lookup here bypasses the soft-delete filter: a deleted row still
//! counts for id collisions, referential existence, and pair uniqueness.

use std::collections::HashSet;

use diesel::prelude::*;

use crate::error::{StoreResult, ValidationError};
use crate::models::{Match, Player, Statistic};
use crate::schema::matches::dsl as m;
use crate::schema::players::dsl as p;
use crate::schema::statistics::dsl as s;

/// Raw field values for a stat line, as collected by the console.
#[derive(Debug, Clone)]
pub struct NewStatisticInput {
    /// Caller-assigned statistic id.
    pub stats_id: i32,
    /// Match the line belongs to.
    pub match_id: i32,
    /// Player the line belongs to.
    pub player_id: i32,
    /// Points scored.
    pub points: Option<i32>,
    /// Rebounds.
    pub rebounds: Option<i32>,
    /// Assists.
    pub assists: Option<i32>,
    /// Steals.
    pub steals: Option<i32>,
    /// Blocks.
    pub blocks: Option<i32>,
    /// Turnovers.
    pub turnovers: Option<i32>,
    /// Minutes on the floor.
    pub minutes_played: Option<i32>,
}

/// Operator decisions that soften individual rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationOptions {
    /// Accept a player whose team is on neither side of the match. Off by
    /// default; the console sets it only after an explicit confirmation.
    pub allow_off_roster: bool,
}

/// Runs the validation pipeline and, when every check passes, returns the
/// row ready to hand to [`crate::service::stats`].
///
/// An off-roster player surfaces as [`ValidationError::OffRoster`] unless
/// `opts.allow_off_roster` is set — the override is a decision the
/// operator has to make, never a default.
pub fn validate_new_statistic(
    conn: &mut SqliteConnection,
    input: &NewStatisticInput,
    opts: ValidationOptions,
) -> StoreResult<Statistic> {
    if input.stats_id <= 0 {
        return Err(ValidationError::NonPositiveId(input.stats_id).into());
    }

    let id_taken: i64 = s::statistics
        .filter(s::stats_id.eq(input.stats_id))
        .count()
        .get_result(conn)?;
    if id_taken > 0 {
        return Err(ValidationError::DuplicateStatisticId(input.stats_id).into());
    }

    let game: Option<Match> = m::matches.find(input.match_id).first(conn).optional()?;
    let Some(game) = game else {
        return Err(ValidationError::UnknownMatch(input.match_id).into());
    };

    let player: Option<Player> = p::players.find(input.player_id).first(conn).optional()?;
    let Some(player) = player else {
        return Err(ValidationError::UnknownPlayer(input.player_id).into());
    };

    if player.team_id != game.home_team_id && player.team_id != game.away_team_id {
        if !opts.allow_off_roster {
            return Err(ValidationError::OffRoster {
                player_id: player.player_id,
                player_team_id: player.team_id,
                match_id: game.match_id,
                home_team_id: game.home_team_id,
                away_team_id: game.away_team_id,
            }
            .into());
        }
        tracing::warn!(
            player_id = player.player_id,
            match_id = game.match_id,
            "recording off-roster statistic on operator override"
        );
    }

    let pair_taken: i64 = s::statistics
        .filter(s::player_id.eq(input.player_id).and(s::match_id.eq(input.match_id)))
        .count()
        .get_result(conn)?;
    if pair_taken > 0 {
        return Err(ValidationError::DuplicatePair {
            player_id: input.player_id,
            match_id: input.match_id,
        }
        .into());
    }

    Ok(Statistic {
        stats_id: input.stats_id,
        match_id: input.match_id,
        player_id: input.player_id,
        points: input.points,
        rebounds: input.rebounds,
        assists: input.assists,
        steals: input.steals,
        blocks: input.blocks,
        turnovers: input.turnovers,
        minutes_played: input.minutes_played,
        deleted: false,
    })
}

/// Validates a whole batch for [`crate::service::stats::create_bulk`].
///
/// Each row runs through the full pipeline, and the batch itself is
/// checked for internal collisions: a stat id or a (player, match) pair
/// repeated within the batch would not collide against the store (no row
/// is inserted yet) but would break uniqueness once the batch commits,
/// so it fails here with the same errors a store collision raises.
pub fn validate_statistic_batch(
    conn: &mut SqliteConnection,
    inputs: &[NewStatisticInput],
    opts: ValidationOptions,
) -> StoreResult<Vec<Statistic>> {
    let mut seen_ids: HashSet<i32> = HashSet::new();
    let mut seen_pairs: HashSet<(i32, i32)> = HashSet::new();

    let mut rows = Vec::with_capacity(inputs.len());
    for input in inputs {
        if !seen_ids.insert(input.stats_id) {
            return Err(ValidationError::DuplicateStatisticId(input.stats_id).into());
        }
        if !seen_pairs.insert((input.player_id, input.match_id)) {
            return Err(ValidationError::DuplicatePair {
                player_id: input.player_id,
                match_id: input.match_id,
            }
            .into());
        }
        rows.push(validate_new_statistic(conn, input, opts)?);
    }
    Ok(rows)
}
