//! User repository for SQLite operations
//!
//! Every read returns a [`UserRecord`]: the user row joined with its roles
//! and optional profile.

use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::core::constants::ROLE_GENERAL;
use crate::data::sqlite::SqliteError;
use crate::data::types::{RoleRow, UserRecord, UserRow};

/// Column list shared by every user query (`u` = users, `p` = user_profiles)
pub(super) const USER_SELECT: &str = "SELECT u.id, u.name, u.email, u.password_hash, \
     u.created_at, u.updated_at, p.avatar_path \
     FROM users u LEFT JOIN user_profiles p ON p.user_id = u.id";

pub(super) type UserTuple = (i64, String, String, String, i64, i64, Option<String>);

/// Create a user and grant the `general` role in one transaction.
///
/// A duplicate email yields `SqliteError::Conflict("Email already exists")`.
pub async fn create_user(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    password_hash: &str,
) -> Result<UserRecord, SqliteError> {
    let now = chrono::Utc::now().timestamp();
    let mut tx = pool.begin().await?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO users (name, email, password_hash, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| SqliteError::from_unique(e, "Email already exists"))?;

    sqlx::query("INSERT OR IGNORE INTO roles (name) VALUES (?)")
        .bind(ROLE_GENERAL)
        .execute(&mut *tx)
        .await?;

    let role: (i64, String) = sqlx::query_as("SELECT id, name FROM roles WHERE name = ?")
        .bind(ROLE_GENERAL)
        .fetch_one(&mut *tx)
        .await?;

    sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES (?, ?)")
        .bind(id)
        .bind(role.0)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::debug!(user_id = id, "User created");

    Ok(UserRecord {
        user: UserRow {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        },
        roles: vec![RoleRow {
            id: role.0,
            name: role.1,
        }],
        avatar_path: None,
    })
}

/// Get a user by ID
pub async fn get_user(pool: &SqlitePool, id: i64) -> Result<Option<UserRecord>, SqliteError> {
    let row = sqlx::query_as::<_, UserTuple>(&format!("{USER_SELECT} WHERE u.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(attach_roles(pool, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

/// Get a user by email (exact match)
pub async fn get_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<UserRecord>, SqliteError> {
    let row = sqlx::query_as::<_, UserTuple>(&format!("{USER_SELECT} WHERE u.email = ?"))
        .bind(email)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(attach_roles(pool, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

/// List all users ordered by ID
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<UserRecord>, SqliteError> {
    let rows = sqlx::query_as::<_, UserTuple>(&format!("{USER_SELECT} ORDER BY u.id"))
        .fetch_all(pool)
        .await?;

    attach_roles(pool, rows).await
}

/// Set (or clear) the avatar path in the user's profile
pub async fn set_avatar_path(
    pool: &SqlitePool,
    user_id: i64,
    avatar_path: Option<&str>,
) -> Result<(), SqliteError> {
    sqlx::query(
        "INSERT INTO user_profiles (user_id, avatar_path) VALUES (?, ?) \
         ON CONFLICT(user_id) DO UPDATE SET avatar_path = excluded.avatar_path",
    )
    .bind(user_id)
    .bind(avatar_path)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load role rows for the given users and assemble records, preserving input order
pub(super) async fn attach_roles(
    pool: &SqlitePool,
    rows: Vec<UserTuple>,
) -> Result<Vec<UserRecord>, SqliteError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT ur.user_id, r.id, r.name FROM user_roles ur \
         JOIN roles r ON r.id = ur.role_id WHERE ur.user_id IN (",
    );
    let mut separated = qb.separated(", ");
    for row in &rows {
        separated.push_bind(row.0);
    }
    separated.push_unseparated(") ORDER BY r.id");

    let role_rows: Vec<(i64, i64, String)> = qb.build_query_as().fetch_all(pool).await?;

    let mut roles_by_user: HashMap<i64, Vec<RoleRow>> = HashMap::new();
    for (user_id, id, name) in role_rows {
        roles_by_user
            .entry(user_id)
            .or_default()
            .push(RoleRow { id, name });
    }

    Ok(rows
        .into_iter()
        .map(
            |(id, name, email, password_hash, created_at, updated_at, avatar_path)| UserRecord {
                roles: roles_by_user.remove(&id).unwrap_or_default(),
                user: UserRow {
                    id,
                    name,
                    email,
                    password_hash,
                    created_at,
                    updated_at,
                },
                avatar_path,
            },
        )
        .collect())
}
