//! Cross-entity transactional operations: player trades and audited
//! arena-capacity changes.

use chrono::Utc;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::Integer;

use crate::error::{StoreError, StoreResult};
use crate::models::{Arena, NewArenaLog, NewPlayerLog, Player, Team};
use crate::schema::arena_log::dsl as al;
use crate::schema::arenas::dsl as a;
use crate::schema::player_log::dsl as pl;
use crate::schema::players::dsl as p;
use crate::schema::teams::dsl as t;

/// Moves a player to another team and appends a `player_log` row, all in
/// one transaction. Both the player and the destination team must exist
/// (deleted rows count — this is a referential check, not a visibility
/// one).
pub fn trade_player(
    conn: &mut SqliteConnection,
    player_id: i32,
    new_team_id: i32,
) -> StoreResult<Player> {
    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let player: Option<Player> = p::players.find(player_id).first(conn).optional()?;
        let Some(mut player) = player else {
            return Err(StoreError::NotFound {
                entity: "player",
                id: player_id,
            }
            .into());
        };

        let team: Option<Team> = t::teams.find(new_team_id).first(conn).optional()?;
        if team.is_none() {
            return Err(StoreError::NotFound {
                entity: "team",
                id: new_team_id,
            }
            .into());
        }

        let old_team_id = player.team_id;
        player.team_id = new_team_id;
        diesel::update(p::players.find(player_id))
            .set(p::team_id.eq(new_team_id))
            .execute(conn)?;

        diesel::insert_into(pl::player_log)
            .values(&NewPlayerLog {
                player_id,
                action: &format!("Traded from team {old_team_id} to team {new_team_id}"),
                action_date: Utc::now().naive_utc(),
            })
            .execute(conn)?;

        tracing::info!(player_id, old_team_id, new_team_id, "player traded");
        Ok(player)
    })
}

/// Updates an arena's capacity and appends an `arena_log` row in one
/// transaction spanning two write mechanisms: the capacity update is a
/// raw parametrized statement, the log append a structured insert. Both
/// commit or neither does.
pub fn update_arena_capacity(
    conn: &mut SqliteConnection,
    arena_id: i32,
    new_capacity: i32,
) -> StoreResult<Arena> {
    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let arena: Option<Arena> = a::arenas.find(arena_id).first(conn).optional()?;
        let Some(arena) = arena else {
            return Err(StoreError::NotFound {
                entity: "arena",
                id: arena_id,
            }
            .into());
        };
        let old_capacity = arena.capacity;

        let updated = sql_query("UPDATE arenas SET capacity = ? WHERE arena_id = ?")
            .bind::<Integer, _>(new_capacity)
            .bind::<Integer, _>(arena_id)
            .execute(conn)?;
        if updated == 0 {
            return Err(StoreError::NotFound {
                entity: "arena",
                id: arena_id,
            }
            .into());
        }

        diesel::insert_into(al::arena_log)
            .values(&NewArenaLog {
                arena_id,
                action: &format!("Capacity updated from {old_capacity} to {new_capacity}"),
                action_date: Utc::now().naive_utc(),
            })
            .execute(conn)?;

        tracing::info!(arena_id, old_capacity, new_capacity, "arena capacity updated");
        Ok(Arena {
            capacity: new_capacity,
            ..arena
        })
    })
}
