mod common;

use common::setup_db;
use diesel::prelude::*;

use courtdb::error::StoreError;
use courtdb::schema::users::dsl as u;
use courtdb::service::auth::{
    self, Permission, Role, UserSeed, authenticate, hash_password, register, seed_users,
    verify_password,
};

#[test]
fn password_hashing_round_trips() {
    let hash = hash_password("hunter2 on the rocks").unwrap();
    assert!(hash.starts_with("$argon2id$"));
    assert!(verify_password("hunter2 on the rocks", &hash));
    assert!(!verify_password("hunter2", &hash));

    // Two hashes of the same password differ (fresh salt each time).
    let again = hash_password("hunter2 on the rocks").unwrap();
    assert_ne!(hash, again);
}

#[test]
fn plaintext_credentials_never_verify() {
    assert!(!verify_password("hunter2", "hunter2"));
    assert!(!verify_password("", ""));
}

#[test]
fn register_then_authenticate() {
    let (_db, mut conn) = setup_db();

    let account = register(&mut conn, "mira", "correct horse", Role::Developer).unwrap();
    assert_eq!(account.role, "Developer");
    assert!(account.last_login.is_none());

    let logged_in = authenticate(&mut conn, "mira", "correct horse")
        .unwrap()
        .expect("valid login");
    assert!(logged_in.last_login.is_some());

    assert!(authenticate(&mut conn, "mira", "wrong").unwrap().is_none());
    assert!(authenticate(&mut conn, "nobody", "correct horse").unwrap().is_none());
}

#[test]
fn register_rejects_duplicate_usernames() {
    let (_db, mut conn) = setup_db();

    register(&mut conn, "mira", "one", Role::Analyst).unwrap();
    let err = register(&mut conn, "mira", "two", Role::Analyst).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StoreError>(),
        Some(StoreError::DuplicateId { entity: "user", .. })
    ));
}

#[test]
fn inactive_accounts_cannot_authenticate() {
    let (_db, mut conn) = setup_db();

    let account = register(&mut conn, "mira", "correct horse", Role::Admin).unwrap();
    diesel::update(u::users.find(account.user_id))
        .set(u::active.eq(false))
        .execute(&mut conn)
        .unwrap();

    assert!(authenticate(&mut conn, "mira", "correct horse").unwrap().is_none());
}

#[test]
fn seeding_upserts_and_reactivates() {
    let (_db, mut conn) = setup_db();

    let seeds = vec![
        UserSeed {
            username: "admin".to_string(),
            password: "first".to_string(),
            role: "Admin".to_string(),
        },
        UserSeed {
            username: "viewer".to_string(),
            password: "look".to_string(),
            role: "Analyst".to_string(),
        },
    ];
    assert_eq!(seed_users(&mut conn, &seeds).unwrap(), 2);
    assert_eq!(auth::user_count(&mut conn).unwrap(), 2);

    // Re-seeding rotates the password and changes the role in place.
    let reseed = vec![UserSeed {
        username: "viewer".to_string(),
        password: "new look".to_string(),
        role: "Developer".to_string(),
    }];
    assert_eq!(seed_users(&mut conn, &reseed).unwrap(), 1);
    assert_eq!(auth::user_count(&mut conn).unwrap(), 2);

    assert!(authenticate(&mut conn, "viewer", "look").unwrap().is_none());
    let viewer = authenticate(&mut conn, "viewer", "new look")
        .unwrap()
        .expect("rotated login");
    assert_eq!(viewer.role, "Developer");
}

#[test]
fn seeding_rejects_unknown_roles() {
    let (_db, mut conn) = setup_db();

    let seeds = vec![UserSeed {
        username: "odd".to_string(),
        password: "pw".to_string(),
        role: "Superuser".to_string(),
    }];
    assert!(seed_users(&mut conn, &seeds).is_err());
}

#[test]
fn seeding_applies_nothing_when_an_entry_is_bad() {
    let (_db, mut conn) = setup_db();
    register(&mut conn, "keeper", "old pass", Role::Analyst).unwrap();

    // A bad role halfway through the file rolls the whole seed back.
    let seeds = vec![
        UserSeed {
            username: "keeper".to_string(),
            password: "rotated".to_string(),
            role: "Admin".to_string(),
        },
        UserSeed {
            username: "fresh".to_string(),
            password: "pw".to_string(),
            role: "Superuser".to_string(),
        },
    ];
    assert!(seed_users(&mut conn, &seeds).is_err());

    assert_eq!(auth::user_count(&mut conn).unwrap(), 1);
    // The first entry's rotation did not stick.
    let keeper = authenticate(&mut conn, "keeper", "old pass")
        .unwrap()
        .expect("untouched account");
    assert_eq!(keeper.role, "Analyst");
    assert!(authenticate(&mut conn, "keeper", "rotated").unwrap().is_none());
}

#[test]
fn role_matrix_matches_the_console_contract() {
    use Permission::*;

    for perm in [View, Create, Edit, SoftDelete, Restore, HardDelete, ManageUsers, RunReports] {
        assert!(Role::Admin.allows(perm));
    }

    assert!(Role::Developer.allows(View));
    assert!(Role::Developer.allows(Create));
    assert!(Role::Developer.allows(Edit));
    assert!(Role::Developer.allows(RunReports));
    assert!(!Role::Developer.allows(SoftDelete));
    assert!(!Role::Developer.allows(Restore));
    assert!(!Role::Developer.allows(HardDelete));
    assert!(!Role::Developer.allows(ManageUsers));

    assert!(Role::Analyst.allows(View));
    assert!(Role::Analyst.allows(RunReports));
    assert!(!Role::Analyst.allows(Create));
    assert!(!Role::Analyst.allows(Edit));
    assert!(!Role::Analyst.allows(SoftDelete));
}

#[test]
fn role_names_round_trip_through_storage_form() {
    for role in [Role::Admin, Role::Developer, Role::Analyst] {
        let parsed: Role = role.as_str().parse().unwrap();
        assert_eq!(parsed, role);
    }
    assert!("Superuser".parse::<Role>().is_err());
}
