//! Category repository for SQLite operations

use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::data::sqlite::SqliteError;
use crate::data::types::CategoryRow;

type CategoryTuple = (i64, String, i64);

fn into_row((id, name, created_at): CategoryTuple) -> CategoryRow {
    CategoryRow {
        id,
        name,
        created_at,
    }
}

/// Create a category.
///
/// A duplicate name yields `SqliteError::Conflict("Category already exists")`.
pub async fn create_category(pool: &SqlitePool, name: &str) -> Result<CategoryRow, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    let id: i64 =
        sqlx::query_scalar("INSERT INTO categories (name, created_at) VALUES (?, ?) RETURNING id")
            .bind(name)
            .bind(now)
            .fetch_one(pool)
            .await
            .map_err(|e| SqliteError::from_unique(e, "Category already exists"))?;

    tracing::debug!(category_id = id, "Category created");

    Ok(CategoryRow {
        id,
        name: name.to_string(),
        created_at: now,
    })
}

pub async fn get_category(pool: &SqlitePool, id: i64) -> Result<Option<CategoryRow>, SqliteError> {
    let row = sqlx::query_as::<_, CategoryTuple>(
        "SELECT id, name, created_at FROM categories WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(into_row))
}

/// All categories ordered by ID
pub async fn list_categories(pool: &SqlitePool) -> Result<Vec<CategoryRow>, SqliteError> {
    let rows = sqlx::query_as::<_, CategoryTuple>(
        "SELECT id, name, created_at FROM categories ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(into_row).collect())
}

/// The categories among `ids` that exist
pub async fn find_categories(
    pool: &SqlitePool,
    ids: &[i64],
) -> Result<Vec<CategoryRow>, SqliteError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb =
        QueryBuilder::<Sqlite>::new("SELECT id, name, created_at FROM categories WHERE id IN (");
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY id");

    let rows: Vec<CategoryTuple> = qb.build_query_as().fetch_all(pool).await?;
    Ok(rows.into_iter().map(into_row).collect())
}

/// Categories of each micropost in `micropost_ids`, keyed by micropost ID.
/// Posts without categories are absent from the map.
pub async fn categories_for(
    pool: &SqlitePool,
    micropost_ids: &[i64],
) -> Result<HashMap<i64, Vec<CategoryRow>>, SqliteError> {
    if micropost_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT mc.micropost_id, c.id, c.name, c.created_at FROM micropost_categories mc \
         JOIN categories c ON c.id = mc.category_id WHERE mc.micropost_id IN (",
    );
    let mut separated = qb.separated(", ");
    for id in micropost_ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY c.id");

    let rows: Vec<(i64, i64, String, i64)> = qb.build_query_as().fetch_all(pool).await?;

    let mut by_post: HashMap<i64, Vec<CategoryRow>> = HashMap::new();
    for (micropost_id, id, name, created_at) in rows {
        by_post.entry(micropost_id).or_default().push(CategoryRow {
            id,
            name,
            created_at,
        });
    }
    Ok(by_post)
}

/// Categories with the most microposts, paired with their post counts.
/// Ties break by lowest ID; empty categories still rank.
pub async fn category_ranking(
    pool: &SqlitePool,
    limit: i64,
) -> Result<Vec<(CategoryRow, i64)>, SqliteError> {
    let rows = sqlx::query_as::<_, (i64, String, i64, i64)>(
        "SELECT c.id, c.name, c.created_at, COUNT(mc.micropost_id) AS post_count \
         FROM categories c LEFT JOIN micropost_categories mc ON mc.category_id = c.id \
         GROUP BY c.id ORDER BY post_count DESC, c.id LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, name, created_at, post_count)| {
            (into_row((id, name, created_at)), post_count)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::SqliteService;
    use crate::data::sqlite::repositories::{create_micropost, create_user};

    async fn setup_test_pool() -> SqlitePool {
        SqliteService::in_memory().await.unwrap().pool().clone()
    }

    #[tokio::test]
    async fn test_create_get_and_list() {
        let pool = setup_test_pool().await;
        let tech = create_category(&pool, "tech").await.unwrap();
        create_category(&pool, "life").await.unwrap();

        let fetched = get_category(&pool, tech.id).await.unwrap().unwrap();
        assert_eq!(fetched, tech);
        assert!(get_category(&pool, 9999).await.unwrap().is_none());

        let names: Vec<String> = list_categories(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["tech", "life"]);
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let pool = setup_test_pool().await;
        create_category(&pool, "tech").await.unwrap();

        let err = create_category(&pool, "tech").await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(err.to_string(), "Conflict: Category already exists");
    }

    #[tokio::test]
    async fn test_find_categories_skips_unknown_ids() {
        let pool = setup_test_pool().await;
        let tech = create_category(&pool, "tech").await.unwrap();

        let found = find_categories(&pool, &[tech.id, 4242]).await.unwrap();
        assert_eq!(found, vec![tech]);
        assert!(find_categories(&pool, &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_categories_for_and_ranking() {
        let pool = setup_test_pool().await;
        let author = create_user(&pool, "A", "a@example.com", "h")
            .await
            .unwrap()
            .user
            .id;
        let tech = create_category(&pool, "tech").await.unwrap();
        let life = create_category(&pool, "life").await.unwrap();
        let empty = create_category(&pool, "empty").await.unwrap();

        let both = create_micropost(&pool, author, "both", None, &[tech.id, life.id])
            .await
            .unwrap();
        let only_life = create_micropost(&pool, author, "life", None, &[life.id])
            .await
            .unwrap();
        let none = create_micropost(&pool, author, "none", None, &[])
            .await
            .unwrap();

        let map = categories_for(&pool, &[both.id, only_life.id, none.id])
            .await
            .unwrap();
        assert_eq!(map[&both.id].len(), 2);
        assert_eq!(map[&only_life.id], vec![life.clone()]);
        assert!(!map.contains_key(&none.id));

        let ranking = category_ranking(&pool, 10).await.unwrap();
        assert_eq!(ranking[0], (life, 2));
        assert_eq!(ranking[1], (tech, 1));
        assert_eq!(ranking[2], (empty, 0));

        assert_eq!(category_ranking(&pool, 1).await.unwrap().len(), 1);
    }
}
