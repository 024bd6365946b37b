mod common;

use common::{datetime, game, seed_league, setup_db, stat, statistic_count};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;

use courtdb::error::{StoreError, ValidationError};
use courtdb::repo;
use courtdb::service::stats;
use courtdb::service::validate::{
    NewStatisticInput, ValidationOptions, validate_new_statistic, validate_statistic_batch,
};

fn input(stats_id: i32, match_id: i32, player_id: i32) -> NewStatisticInput {
    NewStatisticInput {
        stats_id,
        match_id,
        player_id,
        points: Some(20),
        rebounds: Some(6),
        assists: Some(5),
        steals: Some(2),
        blocks: Some(1),
        turnovers: Some(3),
        minutes_played: Some(34),
    }
}

fn validation_error(err: &anyhow::Error) -> &ValidationError {
    err.downcast_ref::<ValidationError>().expect("validation error")
}

#[test]
fn validation_rejects_non_positive_ids_first() {
    let (_db, mut conn) = setup_db();
    seed_league(&mut conn);

    // Even with every other field broken, the id check fires first.
    let err = validate_new_statistic(&mut conn, &input(0, 999, 999), ValidationOptions::default())
        .unwrap_err();
    assert_eq!(*validation_error(&err), ValidationError::NonPositiveId(0));

    let err = validate_new_statistic(&mut conn, &input(-4, 100, 1), ValidationOptions::default())
        .unwrap_err();
    assert_eq!(*validation_error(&err), ValidationError::NonPositiveId(-4));
}

#[test]
fn validation_counts_soft_deleted_rows_for_id_uniqueness() {
    let (_db, mut conn) = setup_db();
    seed_league(&mut conn);

    repo::statistic::create(&mut conn, &stat(10, 100, 1, 30)).unwrap();
    assert!(repo::statistic::delete(&mut conn, 10).unwrap());

    let err = validate_new_statistic(&mut conn, &input(10, 100, 2), ValidationOptions::default())
        .unwrap_err();
    assert_eq!(*validation_error(&err), ValidationError::DuplicateStatisticId(10));
}

#[test]
fn validation_requires_match_then_player() {
    let (_db, mut conn) = setup_db();
    seed_league(&mut conn);

    let err = validate_new_statistic(&mut conn, &input(10, 999, 999), ValidationOptions::default())
        .unwrap_err();
    assert_eq!(*validation_error(&err), ValidationError::UnknownMatch(999));

    let err = validate_new_statistic(&mut conn, &input(10, 100, 999), ValidationOptions::default())
        .unwrap_err();
    assert_eq!(*validation_error(&err), ValidationError::UnknownPlayer(999));
}

#[test]
fn off_roster_blocks_unless_overridden() {
    let (_db, mut conn) = setup_db();
    seed_league(&mut conn);
    // Team 3 plays no part in match 100.
    diesel::insert_into(courtdb::schema::arenas::table)
        .values(&courtdb::models::Arena {
            arena_id: 3,
            arena_name: "West Hall".to_string(),
            city: "Denver".to_string(),
            capacity: 17_000,
        })
        .execute(&mut conn)
        .unwrap();
    repo::team::create(&mut conn, &common::team(3, "Summit Elk")).unwrap();
    repo::player::create(&mut conn, &common::player(7, 3, "Gale")).unwrap();

    let err = validate_new_statistic(&mut conn, &input(10, 100, 7), ValidationOptions::default())
        .unwrap_err();
    assert_eq!(
        *validation_error(&err),
        ValidationError::OffRoster {
            player_id: 7,
            player_team_id: 3,
            match_id: 100,
            home_team_id: 1,
            away_team_id: 2,
        }
    );

    // The explicit override lets the same line through.
    let validated = validate_new_statistic(
        &mut conn,
        &input(10, 100, 7),
        ValidationOptions {
            allow_off_roster: true,
        },
    )
    .unwrap();
    stats::create_statistic(&mut conn, &validated).unwrap();
}

#[test]
fn duplicate_pair_blocks_even_when_soft_deleted() {
    let (_db, mut conn) = setup_db();
    seed_league(&mut conn);

    repo::statistic::create(&mut conn, &stat(10, 100, 1, 30)).unwrap();
    assert!(repo::statistic::delete(&mut conn, 10).unwrap());

    let err = validate_new_statistic(&mut conn, &input(11, 100, 1), ValidationOptions::default())
        .unwrap_err();
    assert_eq!(
        *validation_error(&err),
        ValidationError::DuplicatePair {
            player_id: 1,
            match_id: 100,
        }
    );
}

#[test]
fn create_wraps_persistence_failures_as_transaction_errors() {
    let (_db, mut conn) = setup_db();
    seed_league(&mut conn);

    conn.batch_execute(
        "CREATE TRIGGER fail_stat_insert BEFORE INSERT ON statistics \
         BEGIN SELECT RAISE(ABORT, 'injected failure'); END;",
    )
    .unwrap();

    let err = stats::create_statistic(&mut conn, &stat(10, 100, 1, 30)).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StoreError>(),
        Some(StoreError::Transaction { .. })
    ));
    assert_eq!(statistic_count(&mut conn), 0);
}

#[test]
fn update_touches_counters_only_and_needs_an_existing_row() {
    let (_db, mut conn) = setup_db();
    seed_league(&mut conn);
    repo::statistic::create(&mut conn, &stat(10, 100, 1, 30)).unwrap();

    // The update carries different match/player ids; they must not move.
    let mut changed = stat(10, 999, 999, 45);
    changed.minutes_played = Some(40);
    let updated = stats::update_statistic(&mut conn, &changed).unwrap();
    assert_eq!(updated.points, Some(45));
    assert_eq!(updated.minutes_played, Some(40));
    assert_eq!(updated.match_id, 100);
    assert_eq!(updated.player_id, 1);

    let err = stats::update_statistic(&mut conn, &stat(999, 100, 1, 10)).unwrap_err();
    assert_eq!(*validation_error(&err), ValidationError::MissingStatistic(999));
}

#[test]
fn update_reaches_soft_deleted_rows() {
    let (_db, mut conn) = setup_db();
    seed_league(&mut conn);
    repo::statistic::create(&mut conn, &stat(10, 100, 1, 30)).unwrap();
    assert!(stats::delete_statistic(&mut conn, 10).unwrap());

    // The canonical row is still addressable while hidden.
    let updated = stats::update_statistic(&mut conn, &stat(10, 100, 1, 45)).unwrap();
    assert_eq!(updated.points, Some(45));
    assert!(repo::statistic::get_by_id(&mut conn, 10).unwrap().is_none());
}

#[test]
fn repository_update_is_a_full_replace_including_bindings() {
    let (_db, mut conn) = setup_db();
    seed_league(&mut conn);
    repo::matches::create(&mut conn, &game(101, 2, 1, datetime(2025, 1, 12))).unwrap();
    repo::statistic::create(&mut conn, &stat(10, 100, 1, 30)).unwrap();

    // Unlike the service-layer update, the repository replaces the whole
    // row, match and player bindings included; callers that rebind are
    // expected to have validated the new pair themselves.
    let mut changed = stat(10, 101, 2, 45);
    changed.minutes_played = None;
    repo::statistic::update(&mut conn, &changed).unwrap();

    let line = repo::statistic::get_by_id(&mut conn, 10).unwrap().expect("stat");
    assert_eq!(line.stat.match_id, 101);
    assert_eq!(line.stat.player_id, 2);
    assert_eq!(line.stat.points, Some(45));
    // Clearing an optional counter sticks (full replace, not a patch).
    assert_eq!(line.stat.minutes_played, None);

    let err = repo::statistic::update(&mut conn, &stat(999, 100, 1, 10)).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StoreError>(),
        Some(StoreError::NotFound { entity: "statistic", id: 999 })
    ));
}

#[test]
fn delete_returns_false_for_unknown_ids() {
    let (_db, mut conn) = setup_db();
    seed_league(&mut conn);

    assert!(!stats::delete_statistic(&mut conn, 999).unwrap());
}

#[test]
fn bulk_rejects_an_empty_batch_before_any_transaction() {
    let (_db, mut conn) = setup_db();
    seed_league(&mut conn);

    let err = stats::create_bulk(&mut conn, &[]).unwrap_err();
    assert_eq!(*validation_error(&err), ValidationError::EmptyBatch);
}

#[test]
fn bulk_commits_all_rows_or_none() {
    let (_db, mut conn) = setup_db();
    seed_league(&mut conn);
    repo::matches::create(&mut conn, &game(101, 2, 1, datetime(2025, 1, 12))).unwrap();

    // The third row trips the trigger; the first two must roll back.
    conn.batch_execute(
        "CREATE TRIGGER fail_stat_30 BEFORE INSERT ON statistics \
         WHEN NEW.stats_id = 30 \
         BEGIN SELECT RAISE(ABORT, 'injected failure'); END;",
    )
    .unwrap();

    let batch = [
        stat(20, 100, 1, 18),
        stat(21, 100, 2, 9),
        stat(30, 101, 3, 22),
    ];
    assert!(stats::create_bulk(&mut conn, &batch).is_err());
    assert_eq!(statistic_count(&mut conn), 0);

    // Without the bad row the same batch lands whole.
    let committed = stats::create_bulk(&mut conn, &batch[..2]).unwrap();
    assert_eq!(committed.len(), 2);
    assert_eq!(statistic_count(&mut conn), 2);
}

#[test]
fn batch_validation_rejects_a_pair_repeated_within_the_batch() {
    let (_db, mut conn) = setup_db();
    seed_league(&mut conn);

    // Neither row collides against the store; the pair only repeats
    // inside the batch itself.
    let batch = [input(20, 100, 1), input(21, 100, 1)];
    let err = validate_statistic_batch(&mut conn, &batch, ValidationOptions::default())
        .unwrap_err();
    assert_eq!(
        *validation_error(&err),
        ValidationError::DuplicatePair {
            player_id: 1,
            match_id: 100,
        }
    );
    assert_eq!(statistic_count(&mut conn), 0);

    // The pair stays unique after a distinct batch commits.
    let rows =
        validate_statistic_batch(&mut conn, &[input(20, 100, 1), input(21, 100, 2)], ValidationOptions::default())
            .unwrap();
    stats::create_bulk(&mut conn, &rows).unwrap();
    assert_eq!(statistic_count(&mut conn), 2);
}

#[test]
fn batch_validation_rejects_a_stat_id_repeated_within_the_batch() {
    let (_db, mut conn) = setup_db();
    seed_league(&mut conn);

    let batch = [input(20, 100, 1), input(20, 100, 2)];
    let err = validate_statistic_batch(&mut conn, &batch, ValidationOptions::default())
        .unwrap_err();
    assert_eq!(*validation_error(&err), ValidationError::DuplicateStatisticId(20));
    assert_eq!(statistic_count(&mut conn), 0);
}

#[test]
fn listings_resolve_player_and_match() {
    let (_db, mut conn) = setup_db();
    seed_league(&mut conn);
    repo::statistic::create(&mut conn, &stat(10, 100, 1, 30)).unwrap();
    repo::statistic::create(&mut conn, &stat(11, 100, 2, 12)).unwrap();

    let by_match = repo::statistic::by_match(&mut conn, 100).unwrap();
    assert_eq!(by_match.len(), 2);
    // Points order, highest first.
    assert_eq!(by_match[0].stat.stats_id, 10);
    assert_eq!(by_match[0].player.as_ref().map(|p| p.player_id), Some(1));
    assert_eq!(by_match[0].game.match_id, 100);

    let by_player = repo::statistic::by_player(&mut conn, 2).unwrap();
    assert_eq!(by_player.len(), 1);
    assert_eq!(by_player[0].stat.stats_id, 11);
}
