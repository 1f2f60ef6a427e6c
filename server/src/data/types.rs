//! Row types shared by the repositories and the API layer

use serde::Serialize;

// ============================================================================
// User types
// ============================================================================

/// User row from database (includes the password hash)
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Role row from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleRow {
    pub id: i64,
    pub name: String,
}

/// A stored user joined with its role rows and profile
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user: UserRow,
    pub roles: Vec<RoleRow>,
    pub avatar_path: Option<String>,
}

// ============================================================================
// Micropost types
// ============================================================================

/// Micropost row joined with its author and like count
#[derive(Debug, Clone)]
pub struct MicropostRow {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub user_avatar_path: Option<String>,
    pub title: String,
    pub image_path: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub likes_count: i64,
    pub views_count: i64,
}

/// Like row from database
#[derive(Debug, Clone)]
pub struct LikeRow {
    pub id: i64,
    pub user_id: i64,
    pub micropost_id: i64,
    pub created_at: i64,
}

/// Listing order for microposts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MicropostOrder {
    #[default]
    Newest,
    MostLiked,
    MostViewed,
}

/// Comment row joined with its author
#[derive(Debug, Clone)]
pub struct CommentRow {
    pub id: i64,
    pub micropost_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
}

// ============================================================================
// Category types
// ============================================================================

/// Category row from database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub created_at: i64,
}

/// Role mutation applied by `set_user_roles`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleAction {
    Add,
    Remove,
}
