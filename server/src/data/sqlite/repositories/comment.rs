//! Comment repository for SQLite operations

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::CommentRow;

const COMMENT_SELECT: &str = "SELECT c.id, c.micropost_id, c.user_id, u.name, c.content, \
     c.created_at, c.updated_at FROM comments c JOIN users u ON u.id = c.user_id";

type CommentTuple = (i64, i64, i64, String, String, i64, i64);

fn into_row(
    (id, micropost_id, user_id, user_name, content, created_at, updated_at): CommentTuple,
) -> CommentRow {
    CommentRow {
        id,
        micropost_id,
        user_id,
        user_name,
        content,
        created_at,
        updated_at,
    }
}

pub async fn create_comment(
    pool: &SqlitePool,
    user_id: i64,
    micropost_id: i64,
    content: &str,
) -> Result<CommentRow, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO comments (user_id, micropost_id, content, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(user_id)
    .bind(micropost_id)
    .bind(content)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    tracing::debug!(comment_id = id, micropost_id, user_id, "Comment created");

    get_comment(pool, id)
        .await?
        .ok_or(SqliteError::Database(sqlx::Error::RowNotFound))
}

pub async fn get_comment(pool: &SqlitePool, id: i64) -> Result<Option<CommentRow>, SqliteError> {
    let row = sqlx::query_as::<_, CommentTuple>(&format!("{COMMENT_SELECT} WHERE c.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(into_row))
}

/// Comments on a micropost, newest first
pub async fn list_comments(
    pool: &SqlitePool,
    micropost_id: i64,
) -> Result<Vec<CommentRow>, SqliteError> {
    let rows = sqlx::query_as::<_, CommentTuple>(&format!(
        "{COMMENT_SELECT} WHERE c.micropost_id = ? ORDER BY c.created_at DESC, c.id DESC"
    ))
    .bind(micropost_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(into_row).collect())
}

/// Replace a comment's content. Returns `None` if the comment does not exist.
pub async fn update_comment(
    pool: &SqlitePool,
    id: i64,
    content: &str,
) -> Result<Option<CommentRow>, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    let result = sqlx::query("UPDATE comments SET content = ?, updated_at = ? WHERE id = ?")
        .bind(content)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_comment(pool, id).await
}

/// Returns true if a comment was removed
pub async fn delete_comment(pool: &SqlitePool, id: i64) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
