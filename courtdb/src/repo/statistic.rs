//! Statistic repository. Statistic rows are leaves: delete and restore
//! touch a single row. The transactional create/update paths live in
//! [`crate::service::stats`]; this module is the plain CRUD surface.

use std::collections::HashMap;

use anyhow::Context;
use diesel::prelude::*;

use crate::error::{StoreError, StoreResult};
use crate::models::{Match, Player, StatLine, Statistic};
use crate::repo::Visibility;
use crate::schema::matches::dsl as m;
use crate::schema::players::dsl as p;
use crate::schema::statistics::dsl as s;

/// All non-deleted stat lines with player and match resolved, ordered by
/// points descending.
pub fn list(conn: &mut SqliteConnection) -> StoreResult<Vec<StatLine>> {
    load(conn, Visibility::Active, None)
}

/// All soft-deleted stat lines, mirror of [`list`].
pub fn list_deleted(conn: &mut SqliteConnection) -> StoreResult<Vec<StatLine>> {
    load(conn, Visibility::Deleted, None)
}

/// A single non-deleted stat line with relations resolved, or `None`.
pub fn get_by_id(conn: &mut SqliteConnection, id: i32) -> StoreResult<Option<StatLine>> {
    let mut lines = load(conn, Visibility::Active, Some(id))?;
    Ok(lines.pop())
}

/// Inserts a stat line; the id must be unused by any row, deleted or not.
pub fn create(conn: &mut SqliteConnection, stat: &Statistic) -> StoreResult<Statistic> {
    let existing: Option<Statistic> = s::statistics.find(stat.stats_id).first(conn).optional()?;
    if existing.is_some() {
        return Err(StoreError::DuplicateId {
            entity: "statistic",
            id: stat.stats_id,
        }
        .into());
    }

    let mut row = stat.clone();
    row.deleted = false;
    diesel::insert_into(s::statistics).values(&row).execute(conn)?;
    Ok(row)
}

/// Full-record update of the canonical (unfiltered) row.
pub fn update(conn: &mut SqliteConnection, stat: &Statistic) -> StoreResult<Statistic> {
    let existing: Option<Statistic> = s::statistics.find(stat.stats_id).first(conn).optional()?;
    if existing.is_none() {
        return Err(StoreError::NotFound {
            entity: "statistic",
            id: stat.stats_id,
        }
        .into());
    }

    diesel::update(s::statistics.find(stat.stats_id))
        .set(stat)
        .execute(conn)?;
    Ok(stat.clone())
}

/// Soft-deletes a stat line. Returns `false` when the id is unknown.
pub fn delete(conn: &mut SqliteConnection, id: i32) -> StoreResult<bool> {
    let existing: Option<Statistic> = s::statistics.find(id).first(conn).optional()?;
    if existing.is_none() {
        return Ok(false);
    }

    diesel::update(s::statistics.find(id))
        .set(s::deleted.eq(true))
        .execute(conn)?;
    Ok(true)
}

/// Restores a soft-deleted stat line. Returns `false` when the id is
/// unknown or the row is not deleted; idempotent.
pub fn restore(conn: &mut SqliteConnection, id: i32) -> StoreResult<bool> {
    let existing: Option<Statistic> = s::statistics.find(id).first(conn).optional()?;
    let Some(stat) = existing else {
        return Ok(false);
    };
    if !stat.deleted {
        return Ok(false);
    }

    diesel::update(s::statistics.find(id))
        .set(s::deleted.eq(false))
        .execute(conn)?;
    Ok(true)
}

/// Non-deleted stat lines for one player, newest match first.
pub fn by_player(conn: &mut SqliteConnection, player_id: i32) -> StoreResult<Vec<StatLine>> {
    let rows: Vec<Statistic> = s::statistics
        .filter(s::player_id.eq(player_id).and(s::deleted.eq(false)))
        .load(conn)?;
    let mut lines = resolve(conn, rows)?;
    lines.sort_by(|a, b| b.game.game_date.cmp(&a.game.game_date));
    Ok(lines)
}

/// Non-deleted stat lines for one match, points order.
pub fn by_match(conn: &mut SqliteConnection, match_id: i32) -> StoreResult<Vec<StatLine>> {
    let rows: Vec<Statistic> = s::statistics
        .filter(s::match_id.eq(match_id).and(s::deleted.eq(false)))
        .order(s::points.desc())
        .load(conn)?;
    resolve(conn, rows)
}

fn load(
    conn: &mut SqliteConnection,
    vis: Visibility,
    id: Option<i32>,
) -> StoreResult<Vec<StatLine>> {
    let mut query = s::statistics
        .filter(s::deleted.eq(vis.deleted()))
        .order(s::points.desc())
        .into_boxed();
    if let Some(id) = id {
        query = query.filter(s::stats_id.eq(id));
    }
    let rows: Vec<Statistic> = query.load(conn)?;
    resolve(conn, rows)
}

fn resolve(conn: &mut SqliteConnection, rows: Vec<Statistic>) -> StoreResult<Vec<StatLine>> {
    if rows.is_empty() {
        return Ok(vec![]);
    }

    let player_ids: Vec<i32> = rows.iter().map(|s| s.player_id).collect();
    let players_by_id: HashMap<i32, Player> = p::players
        .filter(p::player_id.eq_any(player_ids))
        .load::<Player>(conn)?
        .into_iter()
        .map(|p| (p.player_id, p))
        .collect();

    let match_ids: Vec<i32> = rows.iter().map(|s| s.match_id).collect();
    let matches_by_id: HashMap<i32, Match> = m::matches
        .filter(m::match_id.eq_any(match_ids))
        .load::<Match>(conn)?
        .into_iter()
        .map(|m| (m.match_id, m))
        .collect();

    rows.into_iter()
        .map(|stat| {
            // Orphaned rows (player hard-deleted) still list; see
            // `HardDeletePolicy::KeepStatistics`.
            let player = players_by_id.get(&stat.player_id).cloned();
            let game = matches_by_id
                .get(&stat.match_id)
                .cloned()
                .with_context(|| {
                    format!("match {} missing for statistic {}", stat.match_id, stat.stats_id)
                })?;
            Ok(StatLine { stat, player, game })
        })
        .collect()
}
