//! Match repository. Soft delete and restore cascade to the match's
//! statistic rows.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use diesel::prelude::*;

use crate::error::{StoreError, StoreResult};
use crate::models::{Match, MatchDetail, Player, Statistic};
use crate::repo::Visibility;
use crate::schema::matches::dsl as m;
use crate::schema::players::dsl as p;
use crate::schema::statistics::dsl as s;

/// All non-deleted matches with their stat lines resolved, newest first.
pub fn list(conn: &mut SqliteConnection) -> StoreResult<Vec<MatchDetail>> {
    load(conn, Visibility::Active, None)
}

/// All soft-deleted matches, mirror of [`list`].
pub fn list_deleted(conn: &mut SqliteConnection) -> StoreResult<Vec<MatchDetail>> {
    load(conn, Visibility::Deleted, None)
}

/// A single non-deleted match with stat lines resolved, or `None`.
pub fn get_by_id(conn: &mut SqliteConnection, id: i32) -> StoreResult<Option<MatchDetail>> {
    let mut details = load(conn, Visibility::Active, Some(id))?;
    Ok(details.pop())
}

/// Inserts a match; the id must be unused by any row, deleted or not.
pub fn create(conn: &mut SqliteConnection, game: &Match) -> StoreResult<Match> {
    let existing: Option<Match> = m::matches.find(game.match_id).first(conn).optional()?;
    if existing.is_some() {
        return Err(StoreError::DuplicateId {
            entity: "match",
            id: game.match_id,
        }
        .into());
    }

    let mut row = game.clone();
    row.deleted = false;
    diesel::insert_into(m::matches).values(&row).execute(conn)?;
    Ok(row)
}

/// Full-record update of the canonical (unfiltered) row.
pub fn update(conn: &mut SqliteConnection, game: &Match) -> StoreResult<Match> {
    let existing: Option<Match> = m::matches.find(game.match_id).first(conn).optional()?;
    if existing.is_none() {
        return Err(StoreError::NotFound {
            entity: "match",
            id: game.match_id,
        }
        .into());
    }

    diesel::update(m::matches.find(game.match_id))
        .set(game)
        .execute(conn)?;
    Ok(game.clone())
}

/// Soft-deletes a match and cascades to its statistic rows. Returns
/// `false` when the id is unknown.
pub fn delete(conn: &mut SqliteConnection, id: i32) -> StoreResult<bool> {
    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let existing: Option<Match> = m::matches.find(id).first(conn).optional()?;
        if existing.is_none() {
            return Ok(false);
        }

        diesel::update(m::matches.find(id))
            .set(m::deleted.eq(true))
            .execute(conn)?;
        let stats = diesel::update(s::statistics.filter(s::match_id.eq(id)))
            .set(s::deleted.eq(true))
            .execute(conn)?;

        tracing::info!(match_id = id, stats, "soft-deleted match with cascade");
        Ok(true)
    })
}

/// Restores a soft-deleted match together with its currently-deleted
/// statistic rows. Returns `false` when the id is unknown or the match is
/// not deleted; idempotent.
pub fn restore(conn: &mut SqliteConnection, id: i32) -> StoreResult<bool> {
    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let existing: Option<Match> = m::matches.find(id).first(conn).optional()?;
        let Some(game) = existing else {
            return Ok(false);
        };
        if !game.deleted {
            return Ok(false);
        }

        diesel::update(m::matches.find(id))
            .set(m::deleted.eq(false))
            .execute(conn)?;
        let stats = diesel::update(s::statistics.filter(s::match_id.eq(id).and(s::deleted.eq(true))))
            .set(s::deleted.eq(false))
            .execute(conn)?;

        tracing::info!(match_id = id, stats, "restored match with cascade");
        Ok(true)
    })
}

/// Non-deleted matches a team played on either side, newest first.
pub fn by_team(conn: &mut SqliteConnection, team_id: i32) -> StoreResult<Vec<MatchDetail>> {
    let rows: Vec<Match> = m::matches
        .filter(
            m::deleted
                .eq(false)
                .and(m::home_team_id.eq(team_id).or(m::away_team_id.eq(team_id))),
        )
        .order(m::game_date.desc())
        .load(conn)?;
    resolve(conn, rows, Visibility::Active)
}

/// Non-deleted matches played on one calendar day, earliest first.
pub fn on_date(conn: &mut SqliteConnection, date: NaiveDate) -> StoreResult<Vec<MatchDetail>> {
    let start = date.and_time(NaiveTime::MIN);
    let end = start + chrono::Duration::days(1);
    in_window(conn, start, end)
}

/// Non-deleted matches within an inclusive date range, earliest first.
pub fn in_range(
    conn: &mut SqliteConnection,
    start: NaiveDate,
    end: NaiveDate,
) -> StoreResult<Vec<MatchDetail>> {
    let start = start.and_time(NaiveTime::MIN);
    let end = end.and_time(NaiveTime::MIN) + chrono::Duration::days(1);
    in_window(conn, start, end)
}

fn in_window(
    conn: &mut SqliteConnection,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> StoreResult<Vec<MatchDetail>> {
    let rows: Vec<Match> = m::matches
        .filter(m::deleted.eq(false).and(m::game_date.ge(start)).and(m::game_date.lt(end)))
        .order(m::game_date.asc())
        .load(conn)?;
    resolve(conn, rows, Visibility::Active)
}

fn load(
    conn: &mut SqliteConnection,
    vis: Visibility,
    id: Option<i32>,
) -> StoreResult<Vec<MatchDetail>> {
    let mut query = m::matches
        .filter(m::deleted.eq(vis.deleted()))
        .order(m::game_date.desc())
        .into_boxed();
    if let Some(id) = id {
        query = query.filter(m::match_id.eq(id));
    }
    let rows: Vec<Match> = query.load(conn)?;
    resolve(conn, rows, vis)
}

/// Resolves stat lines (with their players) for a set of matches.
fn resolve(
    conn: &mut SqliteConnection,
    rows: Vec<Match>,
    vis: Visibility,
) -> StoreResult<Vec<MatchDetail>> {
    if rows.is_empty() {
        return Ok(vec![]);
    }

    let match_ids: Vec<i32> = rows.iter().map(|m| m.match_id).collect();
    let stat_rows: Vec<Statistic> = s::statistics
        .filter(s::match_id.eq_any(match_ids).and(s::deleted.eq(vis.deleted())))
        .order(s::points.desc())
        .load(conn)?;

    let player_ids: Vec<i32> = stat_rows.iter().map(|s| s.player_id).collect();
    let players_by_id: HashMap<i32, Player> = p::players
        .filter(p::player_id.eq_any(player_ids))
        .load::<Player>(conn)?
        .into_iter()
        .map(|p| (p.player_id, p))
        .collect();

    let mut lines_by_match: HashMap<i32, Vec<(Statistic, Player)>> = HashMap::new();
    for stat in stat_rows {
        // A hard-deleted player may have left an orphaned stat row; the
        // listing skips such lines rather than failing the whole read.
        if let Some(player) = players_by_id.get(&stat.player_id).cloned() {
            lines_by_match.entry(stat.match_id).or_default().push((stat, player));
        }
    }

    Ok(rows
        .into_iter()
        .map(|game| {
            let lines = lines_by_match.remove(&game.match_id).unwrap_or_default();
            MatchDetail { game, lines }
        })
        .collect())
}
