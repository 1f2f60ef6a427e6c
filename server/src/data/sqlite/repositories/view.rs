//! Micropost view repository for SQLite operations

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;

/// Record a view of a micropost from a client address (idempotent)
/// Returns true if recorded, false if this address was already counted
pub async fn record_view(
    pool: &SqlitePool,
    micropost_id: i64,
    ip_address: &str,
) -> Result<bool, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    let result = sqlx::query(
        "INSERT INTO micropost_views (micropost_id, ip_address, created_at) VALUES (?, ?, ?) \
         ON CONFLICT DO NOTHING",
    )
    .bind(micropost_id)
    .bind(ip_address)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::SqliteService;
    use crate::data::sqlite::repositories::{create_micropost, create_user, get_micropost};

    #[tokio::test]
    async fn test_each_address_counts_once() {
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

        assert!(record_view(&pool, post, "10.0.0.1").await.unwrap());
        assert!(!record_view(&pool, post, "10.0.0.1").await.unwrap());
        assert!(record_view(&pool, post, "10.0.0.2").await.unwrap());

        let row = get_micropost(&pool, post).await.unwrap().unwrap();
        assert_eq!(row.views_count, 2);
    }
}
