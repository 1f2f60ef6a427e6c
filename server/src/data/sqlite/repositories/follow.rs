//! Follow repository for SQLite operations

use std::collections::HashSet;

use sqlx::SqlitePool;

use super::user::{USER_SELECT, UserTuple, attach_roles};
use crate::data::sqlite::SqliteError;
use crate::data::types::UserRecord;

/// Follow a user (idempotent)
/// Returns true if created, false if already following
pub async fn follow_user(
    pool: &SqlitePool,
    follower_id: i64,
    following_id: i64,
) -> Result<bool, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    let result = sqlx::query(
        "INSERT INTO follows (follower_id, following_id, created_at) VALUES (?, ?, ?) \
         ON CONFLICT DO NOTHING",
    )
    .bind(follower_id)
    .bind(following_id)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Unfollow a user (idempotent)
/// Returns true if removed, false if not following
pub async fn unfollow_user(
    pool: &SqlitePool,
    follower_id: i64,
    following_id: i64,
) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM follows WHERE follower_id = ? AND following_id = ?")
        .bind(follower_id)
        .bind(following_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn is_following(
    pool: &SqlitePool,
    follower_id: i64,
    following_id: i64,
) -> Result<bool, SqliteError> {
    let exists: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM follows WHERE follower_id = ? AND following_id = ?")
            .bind(follower_id)
            .bind(following_id)
            .fetch_optional(pool)
            .await?;

    Ok(exists.is_some())
}

/// IDs of every user `follower_id` follows
pub async fn following_ids(
    pool: &SqlitePool,
    follower_id: i64,
) -> Result<HashSet<i64>, SqliteError> {
    let ids: Vec<i64> = sqlx::query_scalar("SELECT following_id FROM follows WHERE follower_id = ?")
        .bind(follower_id)
        .fetch_all(pool)
        .await?;

    Ok(ids.into_iter().collect())
}

/// Users following `user_id`, oldest follow first
pub async fn list_followers(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<UserRecord>, SqliteError> {
    let rows = sqlx::query_as::<_, UserTuple>(&format!(
        "{USER_SELECT} JOIN follows f ON f.follower_id = u.id \
         WHERE f.following_id = ? ORDER BY f.created_at, u.id"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    attach_roles(pool, rows).await
}

/// Users that `user_id` follows, oldest follow first
pub async fn list_following(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<UserRecord>, SqliteError> {
    let rows = sqlx::query_as::<_, UserTuple>(&format!(
        "{USER_SELECT} JOIN follows f ON f.following_id = u.id \
         WHERE f.follower_id = ? ORDER BY f.created_at, u.id"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    attach_roles(pool, rows).await
}
