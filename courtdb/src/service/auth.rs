//! User accounts, password verification, and the role/permission matrix.
//!
//! Passwords are stored as Argon2id PHC strings with the salt embedded.
//! The store itself never inspects roles; callers look the permission up
//! in [`Role::allows`] before invoking a mutation.

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use diesel::prelude::*;
use serde::Deserialize;

use crate::error::{StoreError, StoreResult};
use crate::models::{NewUser, User};
use crate::schema::users::dsl as u;

/// Console roles, least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Read-only access.
    Analyst,
    /// Create and edit, no deletes.
    Developer,
    /// Everything, including restores and hard deletes.
    Admin,
}

/// Operations a caller can gate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Read the default (non-deleted) views.
    View,
    /// Create new rows.
    Create,
    /// Update existing rows.
    Edit,
    /// Soft-delete rows (with cascade).
    SoftDelete,
    /// Restore soft-deleted rows.
    Restore,
    /// Physically remove a player.
    HardDelete,
    /// Seed or register user accounts.
    ManageUsers,
    /// Run read-only reports.
    RunReports,
}

impl Role {
    /// The static role/permission matrix.
    pub fn allows(self, permission: Permission) -> bool {
        use Permission::*;
        match self {
            Role::Admin => true,
            Role::Developer => matches!(permission, View | Create | Edit | RunReports),
            Role::Analyst => matches!(permission, View | RunReports),
        }
    }

    /// The name stored in the `users.role` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Developer => "Developer",
            Role::Analyst => "Analyst",
        }
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Role::Admin),
            "Developer" => Ok(Role::Developer),
            "Analyst" => Ok(Role::Analyst),
            other => Err(anyhow!("unknown role: {other}")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a TOML user-seed file.
#[derive(Debug, Clone, Deserialize)]
pub struct UserSeed {
    /// Login name.
    pub username: String,
    /// Plaintext password; hashed before it reaches the store.
    pub password: String,
    /// Role name.
    pub role: String,
}

/// A TOML user-seed file: `[[users]]` blocks.
#[derive(Debug, Deserialize)]
pub struct UserSeedFile {
    /// The accounts to seed.
    pub users: Vec<UserSeed>,
}

/// Hashes a password into an Argon2id PHC string.
pub fn hash_password(password: &str) -> StoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("password hashing failed: {e}"))?;
    Ok(hash.to_string())
}

/// Verifies a password against a stored PHC string. Anything that is not
/// a parseable PHC string (e.g. a legacy plaintext credential) fails
/// verification.
pub fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Authenticates an active user. Returns `Ok(None)` for an unknown
/// username, an inactive account, or a failed verification; bumps
/// `last_login` on success.
pub fn authenticate(
    conn: &mut SqliteConnection,
    username: &str,
    password: &str,
) -> StoreResult<Option<User>> {
    let user: Option<User> = u::users
        .filter(u::username.eq(username).and(u::active.eq(true)))
        .first(conn)
        .optional()?;
    let Some(mut user) = user else {
        return Ok(None);
    };

    if !verify_password(password, &user.password_hash) {
        tracing::warn!(username, "failed login attempt");
        return Ok(None);
    }

    let now = Utc::now().naive_utc();
    diesel::update(u::users.find(user.user_id))
        .set(u::last_login.eq(Some(now)))
        .execute(conn)?;
    user.last_login = Some(now);
    Ok(Some(user))
}

/// Registers a new account; usernames are unique. The role string must
/// parse into [`Role`].
pub fn register(
    conn: &mut SqliteConnection,
    username: &str,
    password: &str,
    role: Role,
) -> StoreResult<User> {
    let existing: Option<User> = u::users
        .filter(u::username.eq(username))
        .first(conn)
        .optional()?;
    if let Some(existing) = existing {
        return Err(StoreError::DuplicateId {
            entity: "user",
            id: existing.user_id,
        }
        .into());
    }

    let password_hash = hash_password(password)?;
    let row = NewUser {
        username,
        password_hash: &password_hash,
        role: role.as_str(),
        active: true,
        created_at: Utc::now().naive_utc(),
    };
    let user: User = diesel::insert_into(u::users)
        .values(&row)
        .get_result(conn)?;
    Ok(user)
}

/// Number of accounts in any state. A store with none is considered
/// unprovisioned; the console lets user seeding through without
/// credentials in that state.
pub fn user_count(conn: &mut SqliteConnection) -> StoreResult<i64> {
    let count: i64 = u::users.count().get_result(conn)?;
    Ok(count)
}

/// Upserts accounts from a seed file in one transaction: unknown
/// usernames are inserted, known ones get their hash, role, and active
/// flag refreshed. A bad entry anywhere in the file leaves no account
/// touched.
pub fn seed_users(conn: &mut SqliteConnection, seeds: &[UserSeed]) -> StoreResult<usize> {
    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let mut applied = 0;
        for seed in seeds {
            let role = Role::from_str(&seed.role)?;
            let password_hash = hash_password(&seed.password)?;

            let existing: Option<User> = u::users
                .filter(u::username.eq(&seed.username))
                .first(conn)
                .optional()?;
            match existing {
                Some(user) => {
                    diesel::update(u::users.find(user.user_id))
                        .set((
                            u::password_hash.eq(&password_hash),
                            u::role.eq(role.as_str()),
                            u::active.eq(true),
                        ))
                        .execute(conn)?;
                }
                None => {
                    diesel::insert_into(u::users)
                        .values(&NewUser {
                            username: &seed.username,
                            password_hash: &password_hash,
                            role: role.as_str(),
                            active: true,
                            created_at: Utc::now().naive_utc(),
                        })
                        .execute(conn)?;
                }
            }
            applied += 1;
        }
        tracing::info!(applied, "user seed applied");
        Ok(applied)
    })
}
