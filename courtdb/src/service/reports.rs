//! Read-only reporting. No validation, no transactions — straight reads
//! with the default visibility filter.

use std::collections::HashMap;

use diesel::prelude::*;

use crate::error::StoreResult;
use crate::models::{Match, Player, Team};
use crate::schema::matches::dsl as m;
use crate::schema::players::dsl as p;
use crate::schema::teams::dsl as t;

/// One team's standings summary.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamStanding {
    /// Team id.
    pub team_id: i32,
    /// Team name.
    pub team_name: String,
    /// Active players on the roster.
    pub player_count: usize,
    /// Average roster height in centimeters; 0 for an empty roster.
    pub average_height_cm: f64,
    /// Matches played on either side.
    pub matches: usize,
    /// Matches won.
    pub wins: usize,
    /// Matches lost.
    pub losses: usize,
    /// Average points scored per match; 0 with no matches.
    pub avg_points_for: f64,
    /// Average points conceded per match; 0 with no matches.
    pub avg_points_against: f64,
}

/// Per-team standings across all non-deleted teams and matches, ordered
/// by wins then average points scored.
pub fn team_standings(conn: &mut SqliteConnection) -> StoreResult<Vec<TeamStanding>> {
    let teams: Vec<Team> = t::teams.filter(t::deleted.eq(false)).load(conn)?;
    let players: Vec<Player> = p::players.filter(p::deleted.eq(false)).load(conn)?;
    let games: Vec<Match> = m::matches.filter(m::deleted.eq(false)).load(conn)?;

    let mut roster: HashMap<i32, Vec<&Player>> = HashMap::new();
    for player in &players {
        roster.entry(player.team_id).or_default().push(player);
    }

    let mut standings: Vec<TeamStanding> = teams
        .into_iter()
        .map(|team| {
            let team_players = roster.get(&team.team_id).map(Vec::as_slice).unwrap_or(&[]);
            let average_height_cm = if team_players.is_empty() {
                0.0
            } else {
                team_players.iter().map(|p| p.height_cm).sum::<f64>() / team_players.len() as f64
            };

            let mut matches = 0usize;
            let mut wins = 0usize;
            let mut points_for = 0i64;
            let mut points_against = 0i64;
            for game in &games {
                let (scored, conceded) = if game.home_team_id == team.team_id {
                    (game.home_score, game.away_score)
                } else if game.away_team_id == team.team_id {
                    (game.away_score, game.home_score)
                } else {
                    continue;
                };
                matches += 1;
                points_for += i64::from(scored);
                points_against += i64::from(conceded);
                if scored > conceded {
                    wins += 1;
                }
            }

            let (avg_points_for, avg_points_against) = if matches == 0 {
                (0.0, 0.0)
            } else {
                (
                    (points_for as f64 / matches as f64 * 10.0).round() / 10.0,
                    (points_against as f64 / matches as f64 * 10.0).round() / 10.0,
                )
            };

            TeamStanding {
                team_id: team.team_id,
                team_name: team.team_name,
                player_count: team_players.len(),
                average_height_cm,
                matches,
                wins,
                losses: matches - wins,
                avg_points_for,
                avg_points_against,
            }
        })
        .collect();

    standings.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then(b.avg_points_for.partial_cmp(&a.avg_points_for).unwrap_or(std::cmp::Ordering::Equal))
    });
    Ok(standings)
}
