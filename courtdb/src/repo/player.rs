//! Player repository. Soft delete and restore cascade to the player's
//! statistic rows. Players are the only aggregate with a physical
//! (hard) delete; its handling of dependent statistics is an explicit
//! policy choice, see [`HardDeletePolicy`].

use std::collections::HashMap;

use anyhow::Context;
use chrono::Utc;
use diesel::prelude::*;

use crate::error::{StoreError, StoreResult};
use crate::models::{NewPlayerLog, Player, PlayerDetail, Statistic, Team};
use crate::repo::Visibility;
use crate::schema::player_log::dsl as pl;
use crate::schema::players::dsl as p;
use crate::schema::statistics::dsl as s;
use crate::schema::teams::dsl as t;

/// How [`hard_delete`] treats statistic rows referencing the player.
///
/// The store does not enforce a foreign key here, so `KeepStatistics`
/// leaves orphaned rows behind. That mirrors the long-standing observed
/// behavior; `RequireNoStatistics` is the safe alternative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardDeletePolicy {
    /// Remove the player only; dependent statistic rows are left in place.
    KeepStatistics,
    /// Reject the delete while any statistic row (deleted included) still
    /// references the player.
    RequireNoStatistics,
}

/// Optional filters for [`paged`].
#[derive(Debug, Clone, Default)]
pub struct PageFilter {
    /// Substring match on the team name.
    pub team: Option<String>,
    /// Substring match on the position.
    pub position: Option<String>,
    /// Substring match on first or last name.
    pub search: Option<String>,
}

/// All non-deleted players with team and active stat lines resolved,
/// ordered by surname then first name.
pub fn list(conn: &mut SqliteConnection) -> StoreResult<Vec<PlayerDetail>> {
    load(conn, Visibility::Active, None)
}

/// All soft-deleted players, mirror of [`list`].
pub fn list_deleted(conn: &mut SqliteConnection) -> StoreResult<Vec<PlayerDetail>> {
    load(conn, Visibility::Deleted, None)
}

/// A single non-deleted player with relations resolved, or `None`.
pub fn get_by_id(conn: &mut SqliteConnection, id: i32) -> StoreResult<Option<PlayerDetail>> {
    let mut details = load(conn, Visibility::Active, Some(id))?;
    Ok(details.pop())
}

/// Inserts a player. The id must be unused by any row, deleted or not;
/// the position string is trimmed and the soft-delete flag forced off.
pub fn create(conn: &mut SqliteConnection, player: &Player) -> StoreResult<Player> {
    let existing: Option<Player> = p::players.find(player.player_id).first(conn).optional()?;
    if existing.is_some() {
        return Err(StoreError::DuplicateId {
            entity: "player",
            id: player.player_id,
        }
        .into());
    }

    let mut row = player.clone();
    row.position = row.position.trim().to_string();
    row.deleted = false;
    diesel::insert_into(p::players).values(&row).execute(conn)?;
    Ok(row)
}

/// Full-record update of the canonical (unfiltered) row.
pub fn update(conn: &mut SqliteConnection, player: &Player) -> StoreResult<Player> {
    let existing: Option<Player> = p::players.find(player.player_id).first(conn).optional()?;
    if existing.is_none() {
        return Err(StoreError::NotFound {
            entity: "player",
            id: player.player_id,
        }
        .into());
    }

    let mut row = player.clone();
    row.position = row.position.trim().to_string();
    diesel::update(p::players.find(row.player_id))
        .set(&row)
        .execute(conn)?;
    Ok(row)
}

/// Soft-deletes a player and cascades to the player's statistic rows.
/// Returns `false` when the id is unknown.
pub fn delete(conn: &mut SqliteConnection, id: i32) -> StoreResult<bool> {
    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let existing: Option<Player> = p::players.find(id).first(conn).optional()?;
        if existing.is_none() {
            return Ok(false);
        }

        diesel::update(p::players.find(id))
            .set(p::deleted.eq(true))
            .execute(conn)?;
        let stats = diesel::update(s::statistics.filter(s::player_id.eq(id)))
            .set(s::deleted.eq(true))
            .execute(conn)?;

        tracing::info!(player_id = id, stats, "soft-deleted player with cascade");
        Ok(true)
    })
}

/// Restores a soft-deleted player together with the player's
/// currently-deleted statistic rows. Returns `false` when the id is
/// unknown or the player is not deleted; idempotent.
pub fn restore(conn: &mut SqliteConnection, id: i32) -> StoreResult<bool> {
    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let existing: Option<Player> = p::players.find(id).first(conn).optional()?;
        let Some(player) = existing else {
            return Ok(false);
        };
        if !player.deleted {
            return Ok(false);
        }

        diesel::update(p::players.find(id))
            .set(p::deleted.eq(false))
            .execute(conn)?;
        let stats = diesel::update(s::statistics.filter(s::player_id.eq(id).and(s::deleted.eq(true))))
            .set(s::deleted.eq(false))
            .execute(conn)?;

        tracing::info!(player_id = id, stats, "restored player with cascade");
        Ok(true)
    })
}

/// Physically removes a player; irreversible and independent of the
/// soft-delete flag. Appends an audit-log row. Returns `false` when the
/// id is unknown.
pub fn hard_delete(
    conn: &mut SqliteConnection,
    id: i32,
    policy: HardDeletePolicy,
) -> StoreResult<bool> {
    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let existing: Option<Player> = p::players.find(id).first(conn).optional()?;
        if existing.is_none() {
            return Ok(false);
        }

        if policy == HardDeletePolicy::RequireNoStatistics {
            let count: i64 = s::statistics
                .filter(s::player_id.eq(id))
                .count()
                .get_result(conn)?;
            if count > 0 {
                return Err(StoreError::DependentsExist {
                    entity: "player",
                    id,
                    count,
                }
                .into());
            }
        }

        diesel::delete(p::players.find(id)).execute(conn)?;
        diesel::insert_into(pl::player_log)
            .values(&NewPlayerLog {
                player_id: id,
                action: "Hard deleted",
                action_date: Utc::now().naive_utc(),
            })
            .execute(conn)?;

        tracing::warn!(player_id = id, ?policy, "hard-deleted player");
        Ok(true)
    })
}

/// Active players of one team, jersey-number order.
pub fn by_team(conn: &mut SqliteConnection, team_id: i32) -> StoreResult<Vec<PlayerDetail>> {
    let rows: Vec<Player> = p::players
        .filter(p::team_id.eq(team_id).and(p::deleted.eq(false)))
        .order(p::jersey_number.asc())
        .load(conn)?;
    resolve(conn, rows, Visibility::Active)
}

/// Case-insensitive search across name, position, country, and team name,
/// capped at 50 rows. A blank term falls back to [`list`].
pub fn search(conn: &mut SqliteConnection, term: &str) -> StoreResult<Vec<PlayerDetail>> {
    let term = term.trim();
    if term.is_empty() {
        return list(conn);
    }
    let pattern = format!("%{term}%");

    let matching_teams: Vec<i32> = t::teams
        .filter(t::team_name.like(pattern.clone()))
        .select(t::team_id)
        .load(conn)?;

    let rows: Vec<Player> = p::players
        .filter(
            p::deleted.eq(false).and(
                p::first_name
                    .like(pattern.clone())
                    .or(p::last_name.like(pattern.clone()))
                    .or(p::position.like(pattern.clone()))
                    .or(p::country.like(pattern))
                    .or(p::team_id.eq_any(matching_teams)),
            ),
        )
        .order((p::last_name.asc(), p::first_name.asc()))
        .limit(50)
        .load(conn)?;
    resolve(conn, rows, Visibility::Active)
}

/// One page of active players, surname order. Pages are 1-based.
pub fn paged(
    conn: &mut SqliteConnection,
    page: i64,
    page_size: i64,
    filter: &PageFilter,
) -> StoreResult<Vec<PlayerDetail>> {
    let page = page.max(1);
    let mut query = p::players.filter(p::deleted.eq(false)).into_boxed();

    if let Some(team) = filter.team.as_deref() {
        let matching_teams: Vec<i32> = t::teams
            .filter(t::team_name.like(format!("%{team}%")))
            .select(t::team_id)
            .load(conn)?;
        query = query.filter(p::team_id.eq_any(matching_teams));
    }
    if let Some(position) = filter.position.as_deref() {
        query = query.filter(p::position.like(format!("%{position}%")));
    }
    if let Some(search) = filter.search.as_deref() {
        let pattern = format!("%{search}%");
        query = query.filter(p::first_name.like(pattern.clone()).or(p::last_name.like(pattern)));
    }

    let rows: Vec<Player> = query
        .order((p::last_name.asc(), p::first_name.asc()))
        .offset((page - 1) * page_size)
        .limit(page_size)
        .load(conn)?;
    resolve(conn, rows, Visibility::Active)
}

/// The top `n` active players by total points across their non-deleted
/// stat lines, highest first.
pub fn top_scorers(conn: &mut SqliteConnection, n: usize) -> StoreResult<Vec<(Player, i64)>> {
    let players: Vec<Player> = p::players.filter(p::deleted.eq(false)).load(conn)?;
    let ids: Vec<i32> = players.iter().map(|p| p.player_id).collect();

    let stats: Vec<Statistic> = s::statistics
        .filter(s::player_id.eq_any(ids).and(s::deleted.eq(false)))
        .load(conn)?;
    let mut totals: HashMap<i32, i64> = HashMap::new();
    for stat in stats {
        *totals.entry(stat.player_id).or_default() += i64::from(stat.points.unwrap_or(0));
    }

    let mut scored: Vec<(Player, i64)> = players
        .into_iter()
        .map(|p| {
            let total = totals.get(&p.player_id).copied().unwrap_or(0);
            (p, total)
        })
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.player_id.cmp(&b.0.player_id)));
    scored.truncate(n);
    Ok(scored)
}

fn load(
    conn: &mut SqliteConnection,
    vis: Visibility,
    id: Option<i32>,
) -> StoreResult<Vec<PlayerDetail>> {
    let mut query = p::players
        .filter(p::deleted.eq(vis.deleted()))
        .order((p::last_name.asc(), p::first_name.asc()))
        .into_boxed();
    if let Some(id) = id {
        query = query.filter(p::player_id.eq(id));
    }
    let rows: Vec<Player> = query.load(conn)?;
    resolve(conn, rows, vis)
}

/// Resolves teams and stat lines for an already-ordered set of players.
fn resolve(
    conn: &mut SqliteConnection,
    rows: Vec<Player>,
    vis: Visibility,
) -> StoreResult<Vec<PlayerDetail>> {
    if rows.is_empty() {
        return Ok(vec![]);
    }

    let team_ids: Vec<i32> = rows.iter().map(|p| p.team_id).collect();
    let teams_by_id: HashMap<i32, Team> = t::teams
        .filter(t::team_id.eq_any(team_ids))
        .load::<Team>(conn)?
        .into_iter()
        .map(|t| (t.team_id, t))
        .collect();

    let player_ids: Vec<i32> = rows.iter().map(|p| p.player_id).collect();
    let mut stats_by_player: HashMap<i32, Vec<Statistic>> = HashMap::new();
    let stat_rows: Vec<Statistic> = s::statistics
        .filter(s::player_id.eq_any(player_ids).and(s::deleted.eq(vis.deleted())))
        .load(conn)?;
    for stat in stat_rows {
        stats_by_player.entry(stat.player_id).or_default().push(stat);
    }

    rows.into_iter()
        .map(|player| {
            let team = teams_by_id
                .get(&player.team_id)
                .cloned()
                .with_context(|| {
                    format!("team {} missing for player {}", player.team_id, player.player_id)
                })?;
            let statistics = stats_by_player.remove(&player.player_id).unwrap_or_default();
            Ok(PlayerDetail {
                player,
                team,
                statistics,
            })
        })
        .collect()
}
