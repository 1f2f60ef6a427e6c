//! Role repository for SQLite operations

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::data::sqlite::SqliteError;
use crate::data::types::{RoleAction, RoleRow};

/// List every defined role ordered by ID
pub async fn list_roles(pool: &SqlitePool) -> Result<Vec<RoleRow>, SqliteError> {
    let rows = sqlx::query_as::<_, (i64, String)>("SELECT id, name FROM roles ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(id, name)| RoleRow { id, name })
        .collect())
}

/// Role rows held by a user
pub async fn get_user_roles(pool: &SqlitePool, user_id: i64) -> Result<Vec<RoleRow>, SqliteError> {
    let rows = sqlx::query_as::<_, (i64, String)>(
        "SELECT r.id, r.name FROM user_roles ur JOIN roles r ON r.id = ur.role_id \
         WHERE ur.user_id = ? ORDER BY r.id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, name)| RoleRow { id, name })
        .collect())
}

/// Look up roles by name. Unknown names are simply absent from the result.
pub async fn find_roles_by_name(
    pool: &SqlitePool,
    names: &[String],
) -> Result<Vec<RoleRow>, SqliteError> {
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb = QueryBuilder::<Sqlite>::new("SELECT id, name FROM roles WHERE name IN (");
    let mut separated = qb.separated(", ");
    for name in names {
        separated.push_bind(name);
    }
    separated.push_unseparated(") ORDER BY id");

    let rows: Vec<(i64, String)> = qb.build_query_as().fetch_all(pool).await?;
    Ok(rows
        .into_iter()
        .map(|(id, name)| RoleRow { id, name })
        .collect())
}

/// Add or remove the given role names for a user.
///
/// Returns `Ok(None)` when any name does not match a defined role (nothing is
/// changed), otherwise the user's roles after the update. Adding a held role
/// and removing a missing one are no-ops.
pub async fn set_user_roles(
    pool: &SqlitePool,
    user_id: i64,
    names: &[String],
    action: RoleAction,
) -> Result<Option<Vec<RoleRow>>, SqliteError> {
    let roles = find_roles_by_name(pool, names).await?;

    let mut requested: Vec<&str> = names.iter().map(String::as_str).collect();
    requested.sort_unstable();
    requested.dedup();
    if roles.len() != requested.len() {
        return Ok(None);
    }

    let mut tx = pool.begin().await?;
    for role in &roles {
        let sql = match action {
            RoleAction::Add => "INSERT OR IGNORE INTO user_roles (user_id, role_id) VALUES (?, ?)",
            RoleAction::Remove => "DELETE FROM user_roles WHERE user_id = ? AND role_id = ?",
        };
        sqlx::query(sql)
            .bind(user_id)
            .bind(role.id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    tracing::debug!(user_id, ?action, count = roles.len(), "User roles updated");

    Ok(Some(get_user_roles(pool, user_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::SqliteService;
    use crate::data::sqlite::repositories::create_user;

    async fn setup_test_pool() -> SqlitePool {
        SqliteService::in_memory().await.unwrap().pool().clone()
    }

    fn names(roles: &[RoleRow]) -> Vec<&str> {
        roles.iter().map(|r| r.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_list_roles_seeded() {
        let pool = setup_test_pool().await;
        let roles = list_roles(&pool).await.unwrap();
        assert_eq!(names(&roles), vec!["general", "admin", "read_only_admin"]);
    }

    #[tokio::test]
    async fn test_find_roles_by_name_skips_unknown() {
        let pool = setup_test_pool().await;
        let roles = find_roles_by_name(&pool, &["admin".to_string(), "superuser".to_string()])
            .await
            .unwrap();
        assert_eq!(names(&roles), vec!["admin"]);
        assert!(find_roles_by_name(&pool, &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_and_remove_roles() {
        let pool = setup_test_pool().await;
        let user = create_user(&pool, "A", "a@example.com", "h").await.unwrap();

        let roles = set_user_roles(&pool, user.user.id, &["admin".to_string()], RoleAction::Add)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(names(&roles), vec!["general", "admin"]);

        // adding again is a no-op
        let roles = set_user_roles(&pool, user.user.id, &["admin".to_string()], RoleAction::Add)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(roles.len(), 2);

        let roles = set_user_roles(
            &pool,
            user.user.id,
            &["general".to_string()],
            RoleAction::Remove,
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(names(&roles), vec!["admin"]);
    }

    #[tokio::test]
    async fn test_unknown_role_changes_nothing() {
        let pool = setup_test_pool().await;
        let user = create_user(&pool, "A", "a@example.com", "h").await.unwrap();

        let result = set_user_roles(
            &pool,
            user.user.id,
            &["admin".to_string(), "superuser".to_string()],
            RoleAction::Add,
        )
        .await
        .unwrap();
        assert!(result.is_none());

        let roles = get_user_roles(&pool, user.user.id).await.unwrap();
        assert_eq!(names(&roles), vec!["general"]);
    }
}
