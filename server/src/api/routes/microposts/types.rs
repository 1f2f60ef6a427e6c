//! Micropost API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::auth::Profile;
use crate::api::routes::categories::types::CategoryDto;
use crate::api::types::timestamp;
use crate::core::constants::{DEFAULT_AVATAR_PATH, MAX_COMMENT_LENGTH, MAX_TITLE_LENGTH};
use crate::data::types::{CommentRow, LikeRow, MicropostOrder, MicropostRow};

/// Request body for POST /microposts
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMicropostRequest {
    #[validate(length(min = 1, max = MAX_TITLE_LENGTH, message = "title must be 1-280 characters"))]
    pub title: String,
    pub image_path: Option<String>,
    #[serde(default)]
    pub category_ids: Vec<i64>,
}

/// Sort key accepted by GET /microposts
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    Date,
    Likes,
    MostView,
}

impl From<SortBy> for MicropostOrder {
    fn from(sort: SortBy) -> Self {
        match sort {
            SortBy::Date => Self::Newest,
            SortBy::Likes => Self::MostLiked,
            SortBy::MostView => Self::MostViewed,
        }
    }
}

/// Query parameters for GET /microposts
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[validate(length(max = 200, message = "search must be at most 200 characters"))]
    pub search: Option<String>,
    #[serde(default)]
    pub sort_by: SortBy,
}

/// Author summary embedded in a micropost
#[derive(Debug, Serialize)]
pub struct AuthorDto {
    pub id: i64,
    pub name: String,
    pub profile: Profile,
}

/// Micropost DTO for API responses
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MicropostDto {
    pub id: i64,
    pub title: String,
    pub image_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub likes_count: i64,
    pub views_count: i64,
    pub user: AuthorDto,
    pub categories: Vec<CategoryDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_liked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<CommentDto>>,
}

impl MicropostDto {
    pub fn with_liked(mut self, is_liked: Option<bool>) -> Self {
        self.is_liked = is_liked;
        self
    }

    pub fn with_categories(mut self, categories: Vec<CategoryDto>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_comments(mut self, comments: Vec<CommentDto>) -> Self {
        self.comments = Some(comments);
        self
    }
}

impl From<MicropostRow> for MicropostDto {
    fn from(row: MicropostRow) -> Self {
        let avatar_path = row
            .user_avatar_path
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_AVATAR_PATH.to_string());

        Self {
            id: row.id,
            title: row.title,
            image_path: row.image_path,
            created_at: timestamp(row.created_at),
            updated_at: timestamp(row.updated_at),
            likes_count: row.likes_count,
            views_count: row.views_count,
            user: AuthorDto {
                id: row.user_id,
                name: row.user_name,
                profile: Profile { avatar_path },
            },
            categories: Vec::new(),
            is_liked: None,
            comments: None,
        }
    }
}

/// Like DTO for API responses
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeDto {
    pub id: i64,
    pub user_id: i64,
    pub micropost_id: i64,
    pub created_at: DateTime<Utc>,
}

impl From<LikeRow> for LikeDto {
    fn from(row: LikeRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            micropost_id: row.micropost_id,
            created_at: timestamp(row.created_at),
        }
    }
}

/// Request body for creating or editing a comment
#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(
        min = 1,
        max = MAX_COMMENT_LENGTH,
        message = "content must be 1-1000 characters"
    ))]
    pub content: String,
}

/// Comment author summary
#[derive(Debug, Serialize)]
pub struct CommenterDto {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub id: i64,
    pub content: String,
    pub micropost_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: CommenterDto,
}

impl From<CommentRow> for CommentDto {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            content: row.content,
            micropost_id: row.micropost_id,
            user_id: row.user_id,
            created_at: timestamp(row.created_at),
            updated_at: timestamp(row.updated_at),
            user: CommenterDto {
                id: row.user_id,
                name: row.user_name,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> MicropostRow {
        MicropostRow {
            id: 3,
            user_id: 9,
            user_name: "Author".to_string(),
            user_avatar_path: None,
            title: "Hello".to_string(),
            image_path: None,
            created_at: 1_700_000_000,
            updated_at: 1_700_000_000,
            likes_count: 2,
            views_count: 5,
        }
    }

    #[test]
    fn test_micropost_dto_shape() {
        let json = serde_json::to_value(MicropostDto::from(row())).unwrap();
        assert_eq!(json["likesCount"], 2);
        assert_eq!(json["viewsCount"], 5);
        assert_eq!(json["categories"], serde_json::json!([]));
        assert!(json.get("comments").is_none());
        assert_eq!(json["user"]["id"], 9);
        assert_eq!(json["user"]["profile"]["avatarPath"], DEFAULT_AVATAR_PATH);
        assert!(json["imagePath"].is_null());
        assert!(json.get("isLiked").is_none());
    }

    #[test]
    fn test_micropost_dto_with_liked() {
        let json = serde_json::to_value(MicropostDto::from(row()).with_liked(Some(true))).unwrap();
        assert_eq!(json["isLiked"], true);
    }

    #[test]
    fn test_list_query_defaults_to_date() {
        let query: ListQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.sort_by, SortBy::Date);
        assert_eq!(MicropostOrder::from(query.sort_by), MicropostOrder::Newest);

        let query: ListQuery = serde_json::from_str(r#"{"sortBy":"likes"}"#).unwrap();
        assert_eq!(MicropostOrder::from(query.sort_by), MicropostOrder::MostLiked);

        let query: ListQuery = serde_json::from_str(r#"{"sortBy":"mostView"}"#).unwrap();
        assert_eq!(MicropostOrder::from(query.sort_by), MicropostOrder::MostViewed);
    }

    #[test]
    fn test_create_request_rejects_empty_title() {
        let req: CreateMicropostRequest = serde_json::from_str(r#"{"title":""}"#).unwrap();
        assert!(req.validate().is_err());

        let req: CreateMicropostRequest =
            serde_json::from_str(r#"{"title":"Hi","imagePath":"a.png"}"#).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.image_path.as_deref(), Some("a.png"));
        assert!(req.category_ids.is_empty());

        let req: CreateMicropostRequest =
            serde_json::from_str(r#"{"title":"Hi","categoryIds":[1,2]}"#).unwrap();
        assert_eq!(req.category_ids, vec![1, 2]);
    }

    #[test]
    fn test_comment_dto_shape() {
        let dto = CommentDto::from(CommentRow {
            id: 1,
            micropost_id: 3,
            user_id: 9,
            user_name: "Commenter".to_string(),
            content: "Nice".to_string(),
            created_at: 1_700_000_000,
            updated_at: 1_700_000_100,
        });
        let json = serde_json::to_value(dto).unwrap();
        assert_eq!(json["micropostId"], 3);
        assert_eq!(json["user"], serde_json::json!({"id": 9, "name": "Commenter"}));
        assert_eq!(json["updatedAt"], "2023-11-14T22:15:00Z");
    }

    #[test]
    fn test_comment_request_limits() {
        let req: CommentRequest = serde_json::from_str(r#"{"content":""}"#).unwrap();
        assert!(req.validate().is_err());

        let req = CommentRequest {
            content: "x".repeat(1001),
        };
        assert!(req.validate().is_err());
    }
}
