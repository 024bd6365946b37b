//! Team repository. Deleting or restoring a team cascades to its players
//! and coaches in the same transaction; a partially-cascaded state is
//! never visible.

use std::collections::HashMap;

use anyhow::Context;
use diesel::prelude::*;

use crate::error::{StoreError, StoreResult};
use crate::models::{Arena, Coach, Division, Player, Team, TeamRoster};
use crate::repo::Visibility;
use crate::schema::arenas::dsl as a;
use crate::schema::coaches::dsl as c;
use crate::schema::divisions::dsl as d;
use crate::schema::players::dsl as p;
use crate::schema::teams::dsl as t;

/// All non-deleted teams with arena, division, and active roster resolved,
/// ordered by team name.
pub fn list(conn: &mut SqliteConnection) -> StoreResult<Vec<TeamRoster>> {
    load(conn, Visibility::Active)
}

/// All soft-deleted teams, mirror of [`list`].
pub fn list_deleted(conn: &mut SqliteConnection) -> StoreResult<Vec<TeamRoster>> {
    load(conn, Visibility::Deleted)
}

/// A single non-deleted team with relations resolved, or `None`.
pub fn get_by_id(conn: &mut SqliteConnection, id: i32) -> StoreResult<Option<TeamRoster>> {
    let mut rosters = load_where(conn, Visibility::Active, Some(id))?;
    Ok(rosters.pop())
}

/// Inserts a team. The id must be unused by any row, deleted or not; the
/// soft-delete flag is forced off regardless of the caller's value.
pub fn create(conn: &mut SqliteConnection, team: &Team) -> StoreResult<Team> {
    let existing: Option<Team> = t::teams.find(team.team_id).first(conn).optional()?;
    if existing.is_some() {
        return Err(StoreError::DuplicateId {
            entity: "team",
            id: team.team_id,
        }
        .into());
    }

    let mut row = team.clone();
    row.deleted = false;
    diesel::insert_into(t::teams).values(&row).execute(conn)?;
    Ok(row)
}

/// Full-record update of the canonical (unfiltered) row. Every mutable
/// field is overwritten from the input.
pub fn update(conn: &mut SqliteConnection, team: &Team) -> StoreResult<Team> {
    let existing: Option<Team> = t::teams.find(team.team_id).first(conn).optional()?;
    if existing.is_none() {
        return Err(StoreError::NotFound {
            entity: "team",
            id: team.team_id,
        }
        .into());
    }

    diesel::update(t::teams.find(team.team_id))
        .set(team)
        .execute(conn)?;
    Ok(team.clone())
}

/// Soft-deletes a team and cascades to its players and coaches. Returns
/// `false` when the id is unknown (a no-op, not an error).
pub fn delete(conn: &mut SqliteConnection, id: i32) -> StoreResult<bool> {
    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let existing: Option<Team> = t::teams.find(id).first(conn).optional()?;
        if existing.is_none() {
            return Ok(false);
        }

        diesel::update(t::teams.find(id))
            .set(t::deleted.eq(true))
            .execute(conn)?;

        let players = diesel::update(p::players.filter(p::team_id.eq(id)))
            .set(p::deleted.eq(true))
            .execute(conn)?;
        let coaches = diesel::update(c::coaches.filter(c::team_id.eq(id)))
            .set(c::deleted.eq(true))
            .execute(conn)?;

        tracing::info!(team_id = id, players, coaches, "soft-deleted team with cascade");
        Ok(true)
    })
}

/// Restores a soft-deleted team together with the dependents that are
/// currently deleted. Returns `false` when the id is unknown or the team
/// is not deleted; idempotent.
pub fn restore(conn: &mut SqliteConnection, id: i32) -> StoreResult<bool> {
    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let existing: Option<Team> = t::teams.find(id).first(conn).optional()?;
        let Some(team) = existing else {
            return Ok(false);
        };
        if !team.deleted {
            return Ok(false);
        }

        diesel::update(t::teams.find(id))
            .set(t::deleted.eq(false))
            .execute(conn)?;

        let players = diesel::update(p::players.filter(p::team_id.eq(id).and(p::deleted.eq(true))))
            .set(p::deleted.eq(false))
            .execute(conn)?;
        let coaches = diesel::update(c::coaches.filter(c::team_id.eq(id).and(c::deleted.eq(true))))
            .set(c::deleted.eq(false))
            .execute(conn)?;

        tracing::info!(team_id = id, players, coaches, "restored team with cascade");
        Ok(true)
    })
}

fn load(conn: &mut SqliteConnection, vis: Visibility) -> StoreResult<Vec<TeamRoster>> {
    load_where(conn, vis, None)
}

fn load_where(
    conn: &mut SqliteConnection,
    vis: Visibility,
    id: Option<i32>,
) -> StoreResult<Vec<TeamRoster>> {
    let mut query = t::teams
        .filter(t::deleted.eq(vis.deleted()))
        .order(t::team_name.asc())
        .into_boxed();
    if let Some(id) = id {
        query = query.filter(t::team_id.eq(id));
    }
    let team_rows: Vec<Team> = query.load(conn)?;
    if team_rows.is_empty() {
        return Ok(vec![]);
    }

    let arena_ids: Vec<i32> = team_rows.iter().map(|t| t.arena_id).collect();
    let arenas_by_id: HashMap<i32, Arena> = a::arenas
        .filter(a::arena_id.eq_any(arena_ids))
        .load::<Arena>(conn)?
        .into_iter()
        .map(|a| (a.arena_id, a))
        .collect();

    let division_ids: Vec<i32> = team_rows.iter().map(|t| t.division_id).collect();
    let divisions_by_id: HashMap<i32, Division> = d::divisions
        .filter(d::division_id.eq_any(division_ids))
        .load::<Division>(conn)?
        .into_iter()
        .map(|d| (d.division_id, d))
        .collect();

    let team_ids: Vec<i32> = team_rows.iter().map(|t| t.team_id).collect();
    let mut players_by_team: HashMap<i32, Vec<Player>> = HashMap::new();
    let player_rows: Vec<Player> = p::players
        .filter(p::team_id.eq_any(team_ids.clone()).and(p::deleted.eq(vis.deleted())))
        .order((p::last_name.asc(), p::first_name.asc()))
        .load(conn)?;
    for player in player_rows {
        players_by_team.entry(player.team_id).or_default().push(player);
    }

    let mut coaches_by_team: HashMap<i32, Vec<Coach>> = HashMap::new();
    let coach_rows: Vec<Coach> = c::coaches
        .filter(c::team_id.eq_any(team_ids).and(c::deleted.eq(vis.deleted())))
        .order((c::last_name.asc(), c::first_name.asc()))
        .load(conn)?;
    for coach in coach_rows {
        coaches_by_team.entry(coach.team_id).or_default().push(coach);
    }

    team_rows
        .into_iter()
        .map(|team| {
            let arena = arenas_by_id
                .get(&team.arena_id)
                .cloned()
                .with_context(|| format!("arena {} missing for team {}", team.arena_id, team.team_id))?;
            let division = divisions_by_id
                .get(&team.division_id)
                .cloned()
                .with_context(|| {
                    format!("division {} missing for team {}", team.division_id, team.team_id)
                })?;
            let players = players_by_team.remove(&team.team_id).unwrap_or_default();
            let coaches = coaches_by_team.remove(&team.team_id).unwrap_or_default();
            Ok(TeamRoster {
                team,
                arena,
                division,
                players,
                coaches,
            })
        })
        .collect()
}
