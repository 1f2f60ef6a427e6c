//! Micropost repository for SQLite operations
//!
//! Rows carry the author's name and the current like and view counts so the
//! API layer never needs a second query per post.

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::{MicropostOrder, MicropostRow};

const MICROPOST_SELECT: &str = "SELECT m.id, m.user_id, u.name, p.avatar_path, m.title, \
     m.image_path, m.created_at, m.updated_at, \
     (SELECT COUNT(*) FROM likes l WHERE l.micropost_id = m.id) AS likes_count, \
     (SELECT COUNT(*) FROM micropost_views v WHERE v.micropost_id = m.id) AS views_count \
     FROM microposts m JOIN users u ON u.id = m.user_id \
     LEFT JOIN user_profiles p ON p.user_id = m.user_id";

type MicropostTuple = (
    i64,
    i64,
    String,
    Option<String>,
    String,
    Option<String>,
    i64,
    i64,
    i64,
    i64,
);

fn into_row(
    (
        id,
        user_id,
        user_name,
        user_avatar_path,
        title,
        image_path,
        created_at,
        updated_at,
        likes_count,
        views_count,
    ): MicropostTuple,
) -> MicropostRow {
    MicropostRow {
        id,
        user_id,
        user_name,
        user_avatar_path,
        title,
        image_path,
        created_at,
        updated_at,
        likes_count,
        views_count,
    }
}

impl MicropostOrder {
    fn order_by(self) -> &'static str {
        match self {
            Self::Newest => "ORDER BY m.created_at DESC, m.id DESC",
            Self::MostLiked => "ORDER BY likes_count DESC, m.created_at DESC, m.id DESC",
            Self::MostViewed => "ORDER BY views_count DESC, m.created_at DESC, m.id DESC",
        }
    }
}

/// Create a micropost and link it to `category_ids` in one transaction.
///
/// Callers check that the categories exist; repeated ids are linked once.
pub async fn create_micropost(
    pool: &SqlitePool,
    user_id: i64,
    title: &str,
    image_path: Option<&str>,
    category_ids: &[i64],
) -> Result<MicropostRow, SqliteError> {
    let now = chrono::Utc::now().timestamp();
    let mut tx = pool.begin().await?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO microposts (user_id, title, image_path, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(user_id)
    .bind(title)
    .bind(image_path)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    for category_id in category_ids {
        sqlx::query(
            "INSERT OR IGNORE INTO micropost_categories (micropost_id, category_id) VALUES (?, ?)",
        )
        .bind(id)
        .bind(category_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::debug!(
        micropost_id = id,
        user_id,
        categories = category_ids.len(),
        "Micropost created"
    );

    get_micropost(pool, id)
        .await?
        .ok_or(SqliteError::Database(sqlx::Error::RowNotFound))
}

pub async fn get_micropost(pool: &SqlitePool, id: i64) -> Result<Option<MicropostRow>, SqliteError> {
    let row = sqlx::query_as::<_, MicropostTuple>(&format!("{MICROPOST_SELECT} WHERE m.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(into_row))
}

/// List microposts, optionally filtered by a case-insensitive title substring
pub async fn list_microposts(
    pool: &SqlitePool,
    search: Option<&str>,
    order: MicropostOrder,
) -> Result<Vec<MicropostRow>, SqliteError> {
    let search = search.map(str::trim).filter(|s| !s.is_empty());

    let rows = sqlx::query_as::<_, MicropostTuple>(&format!(
        "{MICROPOST_SELECT} WHERE (?1 IS NULL OR instr(lower(m.title), lower(?1)) > 0) {}",
        order.order_by()
    ))
    .bind(search)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(into_row).collect())
}

/// Microposts written by one user, newest first
pub async fn list_for_user(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<MicropostRow>, SqliteError> {
    let rows = sqlx::query_as::<_, MicropostTuple>(&format!(
        "{MICROPOST_SELECT} WHERE m.user_id = ? {}",
        MicropostOrder::Newest.order_by()
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(into_row).collect())
}

/// Microposts filed under a category, newest first. `None` returns them all.
pub async fn list_for_category(
    pool: &SqlitePool,
    category_id: i64,
    limit: Option<i64>,
) -> Result<Vec<MicropostRow>, SqliteError> {
    let rows = sqlx::query_as::<_, MicropostTuple>(&format!(
        "{MICROPOST_SELECT} WHERE m.id IN \
         (SELECT micropost_id FROM micropost_categories WHERE category_id = ?) {} LIMIT ?",
        MicropostOrder::Newest.order_by()
    ))
    .bind(category_id)
    .bind(limit.unwrap_or(-1))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(into_row).collect())
}

/// The `limit` most liked microposts
pub async fn top_liked(pool: &SqlitePool, limit: i64) -> Result<Vec<MicropostRow>, SqliteError> {
    top_by(pool, MicropostOrder::MostLiked, limit).await
}

/// The `limit` most viewed microposts
pub async fn top_viewed(pool: &SqlitePool, limit: i64) -> Result<Vec<MicropostRow>, SqliteError> {
    top_by(pool, MicropostOrder::MostViewed, limit).await
}

async fn top_by(
    pool: &SqlitePool,
    order: MicropostOrder,
    limit: i64,
) -> Result<Vec<MicropostRow>, SqliteError> {
    let rows = sqlx::query_as::<_, MicropostTuple>(&format!(
        "{MICROPOST_SELECT} {} LIMIT ?",
        order.order_by()
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(into_row).collect())
}
