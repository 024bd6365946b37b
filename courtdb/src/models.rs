//! Entity structs mapped onto the league schema, plus the composite
//! "detail" shapes the repositories hand back with relations resolved.
//!
//! Field order follows the `table!` column order, so every struct derives
//! `Queryable` directly. Structs with nullable columns set
//! `treat_none_as_null` so an update is a full-record replace, never a
//! partial patch.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::schema::{
    arena_log, arenas, coaches, conferences, divisions, matches, player_log, players, statistics,
    teams, users,
};

/// A conference in the league hierarchy.
#[derive(Queryable, Identifiable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = conferences, primary_key(conference_id))]
pub struct Conference {
    /// Caller-assigned identifier.
    pub conference_id: i32,
    /// Display name.
    pub conference_name: String,
}

/// A division; belongs to one conference.
#[derive(Queryable, Identifiable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = divisions, primary_key(division_id))]
pub struct Division {
    /// Caller-assigned identifier.
    pub division_id: i32,
    /// Parent conference.
    pub conference_id: i32,
    /// Display name.
    pub division_name: String,
}

/// A home arena. Referenced by teams; capacity changes are audited in
/// `arena_log`.
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = arenas, primary_key(arena_id))]
pub struct Arena {
    /// Caller-assigned identifier.
    pub arena_id: i32,
    /// Arena name.
    pub arena_name: String,
    /// Home city.
    pub city: String,
    /// Seating capacity; the schema rejects non-positive values.
    pub capacity: i32,
}

/// A team. Owns players and coaches by foreign key; soft-deleting a team
/// cascades to both collections.
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = teams, primary_key(team_id), treat_none_as_null = true)]
pub struct Team {
    /// Caller-assigned identifier.
    pub team_id: i32,
    /// Home arena.
    pub arena_id: i32,
    /// Division membership.
    pub division_id: i32,
    /// Conference membership.
    pub conference_id: i32,
    /// Full team name.
    pub team_name: String,
    /// Short code, e.g. "LAL".
    pub abbreviation: String,
    /// Founding date, when known.
    pub year_founded: Option<NaiveDate>,
    /// Current general manager, when known.
    pub general_manager: Option<String>,
    /// Soft-delete flag.
    pub deleted: bool,
}

/// A coach; belongs to one team.
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = coaches, primary_key(coach_id), treat_none_as_null = true)]
pub struct Coach {
    /// Caller-assigned identifier.
    pub coach_id: i32,
    /// Employing team.
    pub team_id: i32,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Coaching role, e.g. "Head Coach".
    pub role: String,
    /// Tenure start.
    pub start_date: NaiveDate,
    /// Tenure end; `None` for a sitting coach.
    pub end_date: Option<NaiveDate>,
    /// Soft-delete flag.
    pub deleted: bool,
}

/// A player; belongs to one team and owns statistic rows.
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = players, primary_key(player_id))]
pub struct Player {
    /// Caller-assigned identifier.
    pub player_id: i32,
    /// Current team.
    pub team_id: i32,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Playing position, e.g. "PG".
    pub position: String,
    /// Jersey number.
    pub jersey_number: i32,
    /// Date of birth.
    pub birth_date: NaiveDate,
    /// Country of origin.
    pub country: String,
    /// Height in centimeters.
    pub height_cm: f64,
    /// Weight in kilograms.
    pub weight_kg: f64,
    /// Draft year.
    pub draft_year: i32,
    /// Draft round.
    pub draft_round: i32,
    /// Draft pick within the round.
    pub draft_pick: i32,
    /// Soft-delete flag.
    pub deleted: bool,
}

/// A match between two teams. Owns one statistic row per player who
/// played; soft-deleting a match cascades to them.
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = matches, primary_key(match_id))]
pub struct Match {
    /// Caller-assigned identifier.
    pub match_id: i32,
    /// Season label, e.g. "2024-2025".
    pub season: String,
    /// Match type, e.g. "Regular" or "Playoff".
    pub match_type: String,
    /// Tip-off date and time.
    pub game_date: NaiveDateTime,
    /// Home team id.
    pub home_team_id: i32,
    /// Away team id.
    pub away_team_id: i32,
    /// Home final score.
    pub home_score: i32,
    /// Away final score.
    pub away_score: i32,
    /// Soft-delete flag.
    pub deleted: bool,
}

/// A per-player, per-match stat line. At most one non-deleted row per
/// `(player_id, match_id)` pair.
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = statistics, primary_key(stats_id), treat_none_as_null = true)]
pub struct Statistic {
    /// Caller-assigned identifier.
    pub stats_id: i32,
    /// Match this line belongs to.
    pub match_id: i32,
    /// Player this line belongs to.
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
    /// Soft-delete flag.
    pub deleted: bool,
}

/// A console user account.
#[derive(Queryable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = users, primary_key(user_id))]
pub struct User {
    /// Auto-assigned identifier.
    pub user_id: i32,
    /// Unique login name.
    pub username: String,
    /// Argon2id PHC hash string.
    pub password_hash: String,
    /// Role name; parsed into [`crate::service::auth::Role`].
    pub role: String,
    /// Inactive accounts cannot authenticate.
    pub active: bool,
    /// Account creation time (UTC).
    pub created_at: NaiveDateTime,
    /// Last successful login (UTC).
    pub last_login: Option<NaiveDateTime>,
}

/// Insert shape for `users`; the id is assigned by the store.
#[derive(Insertable, Debug)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
    /// Unique login name.
    pub username: &'a str,
    /// Argon2id PHC hash string.
    pub password_hash: &'a str,
    /// Role name.
    pub role: &'a str,
    /// Whether the account may authenticate.
    pub active: bool,
    /// Account creation time (UTC).
    pub created_at: NaiveDateTime,
}

/// A row of the append-only player audit log.
#[derive(Queryable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = player_log, primary_key(log_id))]
pub struct PlayerLogRow {
    /// Auto-assigned identifier.
    pub log_id: i32,
    /// Player the action concerns.
    pub player_id: i32,
    /// Action description.
    pub action: String,
    /// When the action happened.
    pub action_date: NaiveDateTime,
}

/// Insert shape for `player_log`.
#[derive(Insertable, Debug)]
#[diesel(table_name = player_log)]
pub struct NewPlayerLog<'a> {
    /// Player the action concerns.
    pub player_id: i32,
    /// Action description.
    pub action: &'a str,
    /// When the action happened.
    pub action_date: NaiveDateTime,
}

/// A row of the append-only arena audit log.
#[derive(Queryable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = arena_log, primary_key(log_ar_id))]
pub struct ArenaLogRow {
    /// Auto-assigned identifier.
    pub log_ar_id: i32,
    /// Arena the action concerns.
    pub arena_id: i32,
    /// Action description.
    pub action: String,
    /// When the action happened.
    pub action_date: NaiveDateTime,
}

/// Insert shape for `arena_log`.
#[derive(Insertable, Debug)]
#[diesel(table_name = arena_log)]
pub struct NewArenaLog<'a> {
    /// Arena the action concerns.
    pub arena_id: i32,
    /// Action description.
    pub action: &'a str,
    /// When the action happened.
    pub action_date: NaiveDateTime,
}

/// A team with its arena, division, and active (or deleted, for the
/// unfiltered listing) roster resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamRoster {
    /// The team row.
    pub team: Team,
    /// Home arena.
    pub arena: Arena,
    /// Division membership.
    pub division: Division,
    /// Players on the roster, surname order.
    pub players: Vec<Player>,
    /// Coaching staff, surname order.
    pub coaches: Vec<Coach>,
}

/// A player with team and stat lines resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerDetail {
    /// The player row.
    pub player: Player,
    /// Current team.
    pub team: Team,
    /// Stat lines matching the listing's visibility.
    pub statistics: Vec<Statistic>,
}

/// A coach with team and arena resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct CoachDetail {
    /// The coach row.
    pub coach: Coach,
    /// Employing team.
    pub team: Team,
    /// The team's home arena.
    pub arena: Arena,
}

/// A match with its stat lines and their players resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchDetail {
    /// The match row.
    pub game: Match,
    /// Stat lines recorded for the match, points order.
    pub lines: Vec<(Statistic, Player)>,
}

/// A stat line with player and match resolved. A hard-deleted player
/// leaves its stat rows behind, so the player side may be absent.
#[derive(Debug, Clone, PartialEq)]
pub struct StatLine {
    /// The statistic row.
    pub stat: Statistic,
    /// The player it belongs to; `None` for an orphaned row.
    pub player: Option<Player>,
    /// The match it belongs to.
    pub game: Match,
}
