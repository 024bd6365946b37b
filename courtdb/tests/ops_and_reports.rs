mod common;

use common::{arena_log_count, datetime, game, seed_league, setup_db};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;

use courtdb::error::StoreError;
use courtdb::models::ArenaLogRow;
use courtdb::repo;
use courtdb::schema::arena_log;
use courtdb::schema::arenas::dsl as a;
use courtdb::service::{ops, reports};

fn capacity_of(conn: &mut SqliteConnection, arena_id: i32) -> i32 {
    a::arenas
        .find(arena_id)
        .select(a::capacity)
        .get_result(conn)
        .expect("capacity")
}

#[test]
fn trade_moves_the_player_and_logs_it() {
    let (_db, mut conn) = setup_db();
    seed_league(&mut conn);

    let moved = ops::trade_player(&mut conn, 1, 2).unwrap();
    assert_eq!(moved.team_id, 2);

    let detail = repo::player::get_by_id(&mut conn, 1).unwrap().expect("player");
    assert_eq!(detail.team.team_id, 2);

    let log: Vec<courtdb::models::PlayerLogRow> = courtdb::schema::player_log::table
        .load(&mut conn)
        .unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].action, "Traded from team 1 to team 2");
}

#[test]
fn trade_requires_player_and_destination_team() {
    let (_db, mut conn) = setup_db();
    seed_league(&mut conn);

    let err = ops::trade_player(&mut conn, 999, 2).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StoreError>(),
        Some(StoreError::NotFound { entity: "player", id: 999 })
    ));

    let err = ops::trade_player(&mut conn, 1, 999).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StoreError>(),
        Some(StoreError::NotFound { entity: "team", id: 999 })
    ));
    // The player did not move.
    let detail = repo::player::get_by_id(&mut conn, 1).unwrap().expect("player");
    assert_eq!(detail.team.team_id, 1);
}

#[test]
fn capacity_update_writes_value_and_audit_together() {
    let (_db, mut conn) = setup_db();
    seed_league(&mut conn);

    let updated = ops::update_arena_capacity(&mut conn, 1, 21_000).unwrap();
    assert_eq!(updated.capacity, 21_000);
    assert_eq!(capacity_of(&mut conn, 1), 21_000);

    let log: Vec<ArenaLogRow> = arena_log::table.load(&mut conn).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].action, "Capacity updated from 18000 to 21000");
}

#[test]
fn capacity_update_rolls_back_when_the_audit_insert_fails() {
    let (_db, mut conn) = setup_db();
    seed_league(&mut conn);

    // Fail the second write of the transaction; the first must not stick.
    conn.batch_execute(
        "CREATE TRIGGER fail_arena_log BEFORE INSERT ON arena_log \
         BEGIN SELECT RAISE(ABORT, 'injected failure'); END;",
    )
    .unwrap();

    assert!(ops::update_arena_capacity(&mut conn, 1, 21_000).is_err());
    assert_eq!(capacity_of(&mut conn, 1), 18_000);
    assert_eq!(arena_log_count(&mut conn), 0);
}

#[test]
fn capacity_update_rolls_back_on_a_constraint_violation() {
    let (_db, mut conn) = setup_db();
    seed_league(&mut conn);

    // The schema rejects non-positive capacities; the audit row written in
    // the same transaction must vanish with the rollback.
    assert!(ops::update_arena_capacity(&mut conn, 1, 0).is_err());
    assert_eq!(capacity_of(&mut conn, 1), 18_000);
    assert_eq!(arena_log_count(&mut conn), 0);
}

#[test]
fn capacity_update_requires_the_arena() {
    let (_db, mut conn) = setup_db();
    seed_league(&mut conn);

    let err = ops::update_arena_capacity(&mut conn, 999, 21_000).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StoreError>(),
        Some(StoreError::NotFound { entity: "arena", id: 999 })
    ));
}

#[test]
fn standings_aggregate_wins_and_points() {
    let (_db, mut conn) = setup_db();
    seed_league(&mut conn);
    // Seeded match 100: team 1 beat team 2, 101:99. Add a second match the
    // other way around but closer.
    repo::matches::create(&mut conn, &game(101, 2, 1, datetime(2025, 1, 12))).unwrap();

    let standings = reports::team_standings(&mut conn).unwrap();
    assert_eq!(standings.len(), 2);

    // Both teams won once at 101:99; wins tie, order falls to points.
    for row in &standings {
        assert_eq!(row.matches, 2);
        assert_eq!(row.wins, 1);
        assert_eq!(row.losses, 1);
        assert_eq!(row.avg_points_for, 100.0);
        assert_eq!(row.avg_points_against, 100.0);
    }
    let hawks = standings.iter().find(|r| r.team_id == 1).expect("team 1");
    assert_eq!(hawks.player_count, 2);
}

#[test]
fn standings_skip_deleted_teams_and_matches() {
    let (_db, mut conn) = setup_db();
    seed_league(&mut conn);

    assert!(repo::matches::delete(&mut conn, 100).unwrap());
    let standings = reports::team_standings(&mut conn).unwrap();
    assert!(standings.iter().all(|r| r.matches == 0));

    assert!(repo::team::delete(&mut conn, 2).unwrap());
    let standings = reports::team_standings(&mut conn).unwrap();
    assert_eq!(standings.len(), 1);
    assert_eq!(standings[0].team_id, 1);
}
