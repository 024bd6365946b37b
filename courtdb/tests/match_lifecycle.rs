mod common;

use common::{date, datetime, game, seed_league, setup_db, stat};
use courtdb::error::StoreError;
use courtdb::repo;

fn seed_with_stats(conn: &mut diesel::SqliteConnection) {
    seed_league(conn);
    repo::statistic::create(conn, &stat(10, 100, 1, 30)).expect("stat 10");
    repo::statistic::create(conn, &stat(11, 100, 2, 12)).expect("stat 11");
}

#[test]
fn delete_and_restore_cascade_to_stat_lines() {
    let (_db, mut conn) = setup_db();
    seed_with_stats(&mut conn);

    assert!(repo::matches::delete(&mut conn, 100).unwrap());
    assert!(repo::matches::get_by_id(&mut conn, 100).unwrap().is_none());
    assert!(repo::statistic::get_by_id(&mut conn, 10).unwrap().is_none());
    assert!(repo::statistic::get_by_id(&mut conn, 11).unwrap().is_none());

    // The deleted listing carries the deleted lines.
    let deleted = repo::matches::list_deleted(&mut conn).unwrap();
    assert_eq!(deleted.len(), 1);
    assert_eq!(deleted[0].lines.len(), 2);

    assert!(repo::matches::restore(&mut conn, 100).unwrap());
    let detail = repo::matches::get_by_id(&mut conn, 100).unwrap().expect("match back");
    assert_eq!(detail.lines.len(), 2);
    // Points order, highest first.
    assert_eq!(detail.lines[0].0.stats_id, 10);
}

#[test]
fn restore_needs_a_deleted_row() {
    let (_db, mut conn) = setup_db();
    seed_league(&mut conn);

    assert!(!repo::matches::restore(&mut conn, 100).unwrap());
    assert!(!repo::matches::restore(&mut conn, 999).unwrap());
}

#[test]
fn create_rejects_duplicate_ids() {
    let (_db, mut conn) = setup_db();
    seed_league(&mut conn);

    let err = repo::matches::create(&mut conn, &game(100, 2, 1, datetime(2025, 2, 1))).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StoreError>(),
        Some(StoreError::DuplicateId { entity: "match", id: 100 })
    ));
}

#[test]
fn by_team_covers_both_sides() {
    let (_db, mut conn) = setup_db();
    seed_league(&mut conn);
    repo::matches::create(&mut conn, &game(101, 2, 1, datetime(2025, 1, 12))).unwrap();

    let for_team_1 = repo::matches::by_team(&mut conn, 1).unwrap();
    assert_eq!(for_team_1.len(), 2);
    // Newest first.
    assert_eq!(for_team_1[0].game.match_id, 101);

    assert!(repo::matches::by_team(&mut conn, 999).unwrap().is_empty());
}

#[test]
fn date_queries_use_calendar_windows() {
    let (_db, mut conn) = setup_db();
    seed_league(&mut conn); // match 100 tips off 2025-01-10 19:30
    repo::matches::create(&mut conn, &game(101, 2, 1, datetime(2025, 1, 12))).unwrap();

    let on_day = repo::matches::on_date(&mut conn, date(2025, 1, 10)).unwrap();
    assert_eq!(on_day.len(), 1);
    assert_eq!(on_day[0].game.match_id, 100);
    assert!(repo::matches::on_date(&mut conn, date(2025, 1, 11)).unwrap().is_empty());

    // The range is inclusive on both ends.
    let in_range = repo::matches::in_range(&mut conn, date(2025, 1, 10), date(2025, 1, 12)).unwrap();
    assert_eq!(in_range.len(), 2);
    // Earliest first.
    assert_eq!(in_range[0].game.match_id, 100);

    let tail = repo::matches::in_range(&mut conn, date(2025, 1, 11), date(2025, 1, 12)).unwrap();
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].game.match_id, 101);
}

#[test]
fn deleted_matches_drop_out_of_date_queries() {
    let (_db, mut conn) = setup_db();
    seed_league(&mut conn);

    assert!(repo::matches::delete(&mut conn, 100).unwrap());
    assert!(repo::matches::on_date(&mut conn, date(2025, 1, 10)).unwrap().is_empty());
}
