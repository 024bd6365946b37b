#![allow(dead_code)]

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use tempfile::TempDir;

use courtdb::db::{connection, migrate};
use courtdb::models::{Arena, Coach, Conference, Division, Match, Player, Statistic, Team};
use courtdb::schema;

pub struct TestDb {
    _dir: TempDir, // keep alive for the life of the test
    pub path: String,
}

pub fn setup_db() -> (TestDb, SqliteConnection) {
    let dir = TempDir::new().expect("tempdir");
    let mut p = PathBuf::from(dir.path());
    p.push("test.db");
    let path = p.to_string_lossy().to_string();

    migrate::run_sqlite(&path).expect("migrations");
    let conn = connection::connect_sqlite(&path).expect("connect");
    (TestDb { _dir: dir, path }, conn)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn datetime(y: i32, m: u32, d: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(19, 30, 0).unwrap()
}

pub fn team(id: i32, name: &str) -> Team {
    Team {
        team_id: id,
        arena_id: id,
        division_id: 1,
        conference_id: 1,
        team_name: name.to_string(),
        abbreviation: name.chars().take(3).collect::<String>().to_uppercase(),
        year_founded: Some(date(1968, 1, 1)),
        general_manager: None,
        deleted: false,
    }
}

pub fn player(id: i32, team_id: i32, last_name: &str) -> Player {
    Player {
        player_id: id,
        team_id,
        first_name: "Test".to_string(),
        last_name: last_name.to_string(),
        position: "PG".to_string(),
        jersey_number: id,
        birth_date: date(1998, 6, 15),
        country: "USA".to_string(),
        height_cm: 198.0,
        weight_kg: 95.0,
        draft_year: 2019,
        draft_round: 1,
        draft_pick: id,
        deleted: false,
    }
}

pub fn coach(id: i32, team_id: i32, last_name: &str) -> Coach {
    Coach {
        coach_id: id,
        team_id,
        first_name: "Head".to_string(),
        last_name: last_name.to_string(),
        role: "Head Coach".to_string(),
        start_date: date(2020, 9, 1),
        end_date: None,
        deleted: false,
    }
}

pub fn game(id: i32, home: i32, away: i32, day: NaiveDateTime) -> Match {
    Match {
        match_id: id,
        season: "2024-2025".to_string(),
        match_type: "Regular".to_string(),
        game_date: day,
        home_team_id: home,
        away_team_id: away,
        home_score: 101,
        away_score: 99,
        deleted: false,
    }
}

pub fn stat(id: i32, match_id: i32, player_id: i32, points: i32) -> Statistic {
    Statistic {
        stats_id: id,
        match_id,
        player_id,
        points: Some(points),
        rebounds: Some(5),
        assists: Some(4),
        steals: Some(1),
        blocks: Some(0),
        turnovers: Some(2),
        minutes_played: Some(32),
        deleted: false,
    }
}

/// Seeds a small league: one conference and division, arenas 1 and 2,
/// teams 1 and 2, players 1 and 2 on team 1, player 3 on team 2, coach 1
/// on team 1, and match 100 between the two teams.
pub fn seed_league(conn: &mut SqliteConnection) {
    diesel::insert_into(schema::conferences::table)
        .values(&Conference {
            conference_id: 1,
            conference_name: "East".to_string(),
        })
        .execute(conn)
        .expect("conference");
    diesel::insert_into(schema::divisions::table)
        .values(&Division {
            division_id: 1,
            conference_id: 1,
            division_name: "Atlantic".to_string(),
        })
        .execute(conn)
        .expect("division");

    for (id, name, city) in [(1, "North Hall", "Boston"), (2, "South Dome", "Miami")] {
        diesel::insert_into(schema::arenas::table)
            .values(&Arena {
                arena_id: id,
                arena_name: name.to_string(),
                city: city.to_string(),
                capacity: 18_000,
            })
            .execute(conn)
            .expect("arena");
    }

    courtdb::repo::team::create(conn, &team(1, "Harbor Hawks")).expect("team 1");
    courtdb::repo::team::create(conn, &team(2, "Bayou Kings")).expect("team 2");
    courtdb::repo::player::create(conn, &player(1, 1, "Alder")).expect("player 1");
    courtdb::repo::player::create(conn, &player(2, 1, "Brook")).expect("player 2");
    courtdb::repo::player::create(conn, &player(3, 2, "Cove")).expect("player 3");
    courtdb::repo::coach::create(conn, &coach(1, 1, "Drummond")).expect("coach 1");
    courtdb::repo::matches::create(conn, &game(100, 1, 2, datetime(2025, 1, 10)))
        .expect("match 100");
}

pub fn statistic_count(conn: &mut SqliteConnection) -> i64 {
    schema::statistics::table.count().get_result(conn).expect("count")
}

pub fn arena_log_count(conn: &mut SqliteConnection) -> i64 {
    schema::arena_log::table.count().get_result(conn).expect("count")
}

pub fn player_log_count(conn: &mut SqliteConnection) -> i64 {
    schema::player_log::table.count().get_result(conn).expect("count")
}
