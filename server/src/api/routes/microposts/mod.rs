//! Micropost API endpoints

pub mod types;

use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use sqlx::SqlitePool;

use crate::api::auth::{AccessRouter, AuthManager, CurrentUser, OptionalUser, RouteAccess};
use crate::api::extractors::{IdPairPath, IdPath, ValidatedJson, ValidatedQuery};
use crate::api::routes::categories::types::CategoryDto;
use crate::api::types::ApiError;
use crate::data::sqlite::repositories as repo;
use crate::data::types::{CommentRow, MicropostRow};

use types::{CommentDto, CommentRequest, CreateMicropostRequest, LikeDto, ListQuery, MicropostDto};

/// Shared state for Micropost API endpoints
#[derive(Clone)]
pub struct MicropostsApiState {
    pub pool: SqlitePool,
}

/// Build Micropost API routes
pub fn routes(auth_manager: Arc<AuthManager>, pool: SqlitePool) -> Router {
    let state = MicropostsApiState { pool };

    AccessRouter::new(auth_manager)
        .route("/", RouteAccess::AUTHENTICATED, post(create_micropost))
        .route("/", RouteAccess::OPTIONAL, get(list_microposts))
        .route("/user/{id}", RouteAccess::OPTIONAL, get(list_user_microposts))
        .route("/{id}", RouteAccess::OPTIONAL, get(get_micropost))
        .route(
            "/{id}/likes",
            RouteAccess::AUTHENTICATED,
            post(like_micropost).delete(unlike_micropost),
        )
        .route(
            "/{id}/comments",
            RouteAccess::AUTHENTICATED,
            get(list_comments).post(create_comment),
        )
        .route(
            "/{id}/comments/{comment_id}",
            RouteAccess::AUTHENTICATED,
            put(update_comment).delete(delete_comment),
        )
        .with_state(state)
}

async fn require_micropost(pool: &SqlitePool, id: i64) -> Result<MicropostRow, ApiError> {
    repo::get_micropost(pool, id)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| ApiError::not_found(format!("Micropost with ID {id} not found")))
}

/// A comment that belongs to the given micropost
async fn require_comment(
    pool: &SqlitePool,
    micropost_id: i64,
    id: i64,
) -> Result<CommentRow, ApiError> {
    repo::get_comment(pool, id)
        .await
        .map_err(ApiError::from_sqlite)?
        .filter(|c| c.micropost_id == micropost_id)
        .ok_or_else(|| ApiError::not_found(format!("Comment with ID {id} not found")))
}

/// Convert rows to DTOs carrying their categories
pub async fn micropost_dtos(
    pool: &SqlitePool,
    rows: Vec<MicropostRow>,
) -> Result<Vec<MicropostDto>, ApiError> {
    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let mut categories = repo::categories_for(pool, &ids)
        .await
        .map_err(ApiError::from_sqlite)?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let row_categories = categories.remove(&row.id).unwrap_or_default();
            MicropostDto::from(row)
                .with_categories(row_categories.into_iter().map(CategoryDto::from).collect())
        })
        .collect())
}

async fn micropost_dto(pool: &SqlitePool, row: MicropostRow) -> Result<MicropostDto, ApiError> {
    let id = row.id;
    micropost_dtos(pool, vec![row])
        .await?
        .pop()
        .ok_or_else(|| ApiError::not_found(format!("Micropost with ID {id} not found")))
}

/// Create a micropost authored by the caller
pub async fn create_micropost(
    State(state): State<MicropostsApiState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(body): ValidatedJson<CreateMicropostRequest>,
) -> Result<(StatusCode, Json<MicropostDto>), ApiError> {
    let title = body.title.trim();
    if title.is_empty() {
        return Err(ApiError::bad_request("title should not be empty"));
    }

    let mut seen = HashSet::new();
    let category_ids: Vec<i64> = body
        .category_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();
    let found = repo::find_categories(&state.pool, &category_ids)
        .await
        .map_err(ApiError::from_sqlite)?;
    if found.len() != category_ids.len() {
        return Err(ApiError::bad_request("One or more categories do not exist"));
    }

    let row = repo::create_micropost(
        &state.pool,
        user.id,
        title,
        body.image_path.as_deref(),
        &category_ids,
    )
    .await
    .map_err(ApiError::from_sqlite)?;

    Ok((
        StatusCode::CREATED,
        Json(micropost_dto(&state.pool, row).await?),
    ))
}

/// List microposts with optional title search and sort order
pub async fn list_microposts(
    State(state): State<MicropostsApiState>,
    ValidatedQuery(query): ValidatedQuery<ListQuery>,
) -> Result<Json<Vec<MicropostDto>>, ApiError> {
    let rows = repo::list_microposts(&state.pool, query.search.as_deref(), query.sort_by.into())
        .await
        .map_err(ApiError::from_sqlite)?;

    Ok(Json(micropost_dtos(&state.pool, rows).await?))
}

/// Microposts written by one user
pub async fn list_user_microposts(
    State(state): State<MicropostsApiState>,
    IdPath(user_id): IdPath,
) -> Result<Json<Vec<MicropostDto>>, ApiError> {
    let rows = repo::list_microposts_for_user(&state.pool, user_id)
        .await
        .map_err(ApiError::from_sqlite)?;

    Ok(Json(micropost_dtos(&state.pool, rows).await?))
}

/// One micropost with its comments, plus `isLiked` when the caller is signed in
pub async fn get_micropost(
    State(state): State<MicropostsApiState>,
    IdPath(id): IdPath,
    OptionalUser(caller): OptionalUser,
) -> Result<Json<MicropostDto>, ApiError> {
    let row = require_micropost(&state.pool, id).await?;

    let is_liked = match caller {
        Some(caller) => Some(
            repo::has_liked(&state.pool, caller.id, id)
                .await
                .map_err(ApiError::from_sqlite)?,
        ),
        None => None,
    };

    let comments = repo::list_comments(&state.pool, id)
        .await
        .map_err(ApiError::from_sqlite)?;

    Ok(Json(
        micropost_dto(&state.pool, row)
            .await?
            .with_liked(is_liked)
            .with_comments(comments.into_iter().map(CommentDto::from).collect()),
    ))
}

/// Like a micropost
pub async fn like_micropost(
    State(state): State<MicropostsApiState>,
    IdPath(id): IdPath,
    CurrentUser(user): CurrentUser,
) -> Result<(StatusCode, Json<LikeDto>), ApiError> {
    require_micropost(&state.pool, id).await?;

    let like = repo::create_like(&state.pool, user.id, id)
        .await
        .map_err(ApiError::from_sqlite)?;

    tracing::debug!(user_id = user.id, micropost_id = id, "Micropost liked");
    Ok((StatusCode::CREATED, Json(LikeDto::from(like))))
}

/// Remove the caller's like from a micropost
pub async fn unlike_micropost(
    State(state): State<MicropostsApiState>,
    IdPath(id): IdPath,
    CurrentUser(user): CurrentUser,
) -> Result<Json<LikeDto>, ApiError> {
    let like = repo::delete_like(&state.pool, user.id, id)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| ApiError::not_found("Like not found"))?;

    tracing::debug!(user_id = user.id, micropost_id = id, "Micropost unliked");
    Ok(Json(LikeDto::from(like)))
}

/// Comments on a micropost, newest first
pub async fn list_comments(
    State(state): State<MicropostsApiState>,
    IdPath(id): IdPath,
) -> Result<Json<Vec<CommentDto>>, ApiError> {
    require_micropost(&state.pool, id).await?;

    let rows = repo::list_comments(&state.pool, id)
        .await
        .map_err(ApiError::from_sqlite)?;

    Ok(Json(rows.into_iter().map(CommentDto::from).collect()))
}

/// Comment on a micropost as the caller
pub async fn create_comment(
    State(state): State<MicropostsApiState>,
    IdPath(id): IdPath,
    CurrentUser(user): CurrentUser,
    ValidatedJson(body): ValidatedJson<CommentRequest>,
) -> Result<(StatusCode, Json<CommentDto>), ApiError> {
    let content = body.content.trim();
    if content.is_empty() {
        return Err(ApiError::bad_request("content should not be empty"));
    }
    require_micropost(&state.pool, id).await?;

    let row = repo::create_comment(&state.pool, user.id, id, content)
        .await
        .map_err(ApiError::from_sqlite)?;

    Ok((StatusCode::CREATED, Json(CommentDto::from(row))))
}

/// Edit one of the caller's comments
pub async fn update_comment(
    State(state): State<MicropostsApiState>,
    IdPairPath(micropost_id, comment_id): IdPairPath,
    CurrentUser(user): CurrentUser,
    ValidatedJson(body): ValidatedJson<CommentRequest>,
) -> Result<Json<CommentDto>, ApiError> {
    let content = body.content.trim();
    if content.is_empty() {
        return Err(ApiError::bad_request("content should not be empty"));
    }

    let comment = require_comment(&state.pool, micropost_id, comment_id).await?;
    if comment.user_id != user.id {
        return Err(ApiError::forbidden("You can only update your own comments"));
    }

    let row = repo::update_comment(&state.pool, comment_id, content)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| ApiError::not_found(format!("Comment with ID {comment_id} not found")))?;

    Ok(Json(CommentDto::from(row)))
}

/// Delete one of the caller's comments and return it
pub async fn delete_comment(
    State(state): State<MicropostsApiState>,
    IdPairPath(micropost_id, comment_id): IdPairPath,
    CurrentUser(user): CurrentUser,
) -> Result<Json<CommentDto>, ApiError> {
    let comment = require_comment(&state.pool, micropost_id, comment_id).await?;
    if comment.user_id != user.id {
        return Err(ApiError::forbidden("You can only delete your own comments"));
    }

    repo::delete_comment(&state.pool, comment_id)
        .await
        .map_err(ApiError::from_sqlite)?;

    tracing::debug!(user_id = user.id, comment_id, "Comment deleted");
    Ok(Json(CommentDto::from(comment)))
}
