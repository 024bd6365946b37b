//! Coach repository. Coaches carry no dependents, so delete and restore
//! touch a single row.

use std::collections::HashMap;

use anyhow::Context;
use diesel::prelude::*;

use crate::error::{StoreError, StoreResult};
use crate::models::{Arena, Coach, CoachDetail, Team};
use crate::repo::Visibility;
use crate::schema::arenas::dsl as a;
use crate::schema::coaches::dsl as c;
use crate::schema::teams::dsl as t;

/// All non-deleted coaches with team and arena resolved, surname order.
pub fn list(conn: &mut SqliteConnection) -> StoreResult<Vec<CoachDetail>> {
    load(conn, Visibility::Active, None)
}

/// All soft-deleted coaches, mirror of [`list`].
pub fn list_deleted(conn: &mut SqliteConnection) -> StoreResult<Vec<CoachDetail>> {
    load(conn, Visibility::Deleted, None)
}

/// A single non-deleted coach with relations resolved, or `None`.
pub fn get_by_id(conn: &mut SqliteConnection, id: i32) -> StoreResult<Option<CoachDetail>> {
    let mut details = load(conn, Visibility::Active, Some(id))?;
    Ok(details.pop())
}

/// Inserts a coach; the id must be unused by any row, deleted or not.
pub fn create(conn: &mut SqliteConnection, coach: &Coach) -> StoreResult<Coach> {
    let existing: Option<Coach> = c::coaches.find(coach.coach_id).first(conn).optional()?;
    if existing.is_some() {
        return Err(StoreError::DuplicateId {
            entity: "coach",
            id: coach.coach_id,
        }
        .into());
    }

    let mut row = coach.clone();
    row.deleted = false;
    diesel::insert_into(c::coaches).values(&row).execute(conn)?;
    Ok(row)
}

/// Full-record update of the canonical (unfiltered) row.
pub fn update(conn: &mut SqliteConnection, coach: &Coach) -> StoreResult<Coach> {
    let existing: Option<Coach> = c::coaches.find(coach.coach_id).first(conn).optional()?;
    if existing.is_none() {
        return Err(StoreError::NotFound {
            entity: "coach",
            id: coach.coach_id,
        }
        .into());
    }

    diesel::update(c::coaches.find(coach.coach_id))
        .set(coach)
        .execute(conn)?;
    Ok(coach.clone())
}

/// Soft-deletes a coach. Returns `false` when the id is unknown.
pub fn delete(conn: &mut SqliteConnection, id: i32) -> StoreResult<bool> {
    let existing: Option<Coach> = c::coaches.find(id).first(conn).optional()?;
    if existing.is_none() {
        return Ok(false);
    }

    diesel::update(c::coaches.find(id))
        .set(c::deleted.eq(true))
        .execute(conn)?;
    Ok(true)
}

/// Restores a soft-deleted coach. Returns `false` when the id is unknown
/// or the coach is not deleted; idempotent.
pub fn restore(conn: &mut SqliteConnection, id: i32) -> StoreResult<bool> {
    let existing: Option<Coach> = c::coaches.find(id).first(conn).optional()?;
    let Some(coach) = existing else {
        return Ok(false);
    };
    if !coach.deleted {
        return Ok(false);
    }

    diesel::update(c::coaches.find(id))
        .set(c::deleted.eq(false))
        .execute(conn)?;
    Ok(true)
}

fn load(
    conn: &mut SqliteConnection,
    vis: Visibility,
    id: Option<i32>,
) -> StoreResult<Vec<CoachDetail>> {
    let mut query = c::coaches
        .filter(c::deleted.eq(vis.deleted()))
        .order((c::last_name.asc(), c::first_name.asc()))
        .into_boxed();
    if let Some(id) = id {
        query = query.filter(c::coach_id.eq(id));
    }
    let coach_rows: Vec<Coach> = query.load(conn)?;
    if coach_rows.is_empty() {
        return Ok(vec![]);
    }

    let team_ids: Vec<i32> = coach_rows.iter().map(|c| c.team_id).collect();
    let teams_by_id: HashMap<i32, Team> = t::teams
        .filter(t::team_id.eq_any(team_ids))
        .load::<Team>(conn)?
        .into_iter()
        .map(|t| (t.team_id, t))
        .collect();

    let arena_ids: Vec<i32> = teams_by_id.values().map(|t| t.arena_id).collect();
    let arenas_by_id: HashMap<i32, Arena> = a::arenas
        .filter(a::arena_id.eq_any(arena_ids))
        .load::<Arena>(conn)?
        .into_iter()
        .map(|a| (a.arena_id, a))
        .collect();

    coach_rows
        .into_iter()
        .map(|coach| {
            let team = teams_by_id
                .get(&coach.team_id)
                .cloned()
                .with_context(|| format!("team {} missing for coach {}", coach.team_id, coach.coach_id))?;
            let arena = arenas_by_id
                .get(&team.arena_id)
                .cloned()
                .with_context(|| format!("arena {} missing for team {}", team.arena_id, team.team_id))?;
            Ok(CoachDetail { coach, team, arena })
        })
        .collect()
}
