//! Like repository for SQLite operations

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::LikeRow;

/// Like a micropost.
///
/// A second like by the same user yields
/// `SqliteError::Conflict("User has already liked this micropost")`.
pub async fn create_like(
    pool: &SqlitePool,
    user_id: i64,
    micropost_id: i64,
) -> Result<LikeRow, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO likes (user_id, micropost_id, created_at) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(user_id)
    .bind(micropost_id)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| SqliteError::from_unique(e, "User has already liked this micropost"))?;

    Ok(LikeRow {
        id,
        user_id,
        micropost_id,
        created_at: now,
    })
}

/// Remove a like. Returns the deleted row, or `None` if there was none.
pub async fn delete_like(
    pool: &SqlitePool,
    user_id: i64,
    micropost_id: i64,
) -> Result<Option<LikeRow>, SqliteError> {
    let row = sqlx::query_as::<_, (i64, i64, i64, i64)>(
        "DELETE FROM likes WHERE user_id = ? AND micropost_id = ? \
         RETURNING id, user_id, micropost_id, created_at",
    )
    .bind(user_id)
    .bind(micropost_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(id, user_id, micropost_id, created_at)| LikeRow {
        id,
        user_id,
        micropost_id,
        created_at,
    }))
}

pub async fn has_liked(
    pool: &SqlitePool,
    user_id: i64,
    micropost_id: i64,
) -> Result<bool, SqliteError> {
    let exists: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM likes WHERE user_id = ? AND micropost_id = ?")
            .bind(user_id)
            .bind(micropost_id)
            .fetch_optional(pool)
            .await?;

    Ok(exists.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::SqliteService;
    use crate::data::sqlite::repositories::{create_micropost, create_user};

    async fn setup() -> (SqlitePool, i64, i64) {
        let pool = SqliteService::in_memory().await.unwrap().pool().clone();
        let user = create_user(&pool, "A", "a@example.com", "h")
            .await
            .unwrap()
            .user
            .id;
        let post = create_micropost(&pool, user, "post", None, &[])
            .await
            .unwrap()
            .id;
        (pool, user, post)
    }

    #[tokio::test]
    async fn test_like_and_has_liked() {
        let (pool, user, post) = setup().await;
        assert!(!has_liked(&pool, user, post).await.unwrap());

        let like = create_like(&pool, user, post).await.unwrap();
        assert_eq!(like.micropost_id, post);
        assert!(has_liked(&pool, user, post).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_like_conflicts() {
        let (pool, user, post) = setup().await;
        create_like(&pool, user, post).await.unwrap();

        let err = create_like(&pool, user, post).await.unwrap_err();
        assert!(err.is_conflict());
        assert!(err.to_string().contains("already liked"));
    }

    #[tokio::test]
    async fn test_delete_like() {
        let (pool, user, post) = setup().await;
        assert!(delete_like(&pool, user, post).await.unwrap().is_none());

        let like = create_like(&pool, user, post).await.unwrap();
        let deleted = delete_like(&pool, user, post).await.unwrap().unwrap();
        assert_eq!(deleted.id, like.id);
        assert!(!has_liked(&pool, user, post).await.unwrap());
    }
}
