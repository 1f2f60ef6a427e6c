//! User API endpoints

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use sqlx::SqlitePool;

use crate::api::auth::identity::details;
use crate::api::auth::{
    AccessRouter, AuthManager, CurrentUser, OptionalUser, RouteAccess, UserDetails,
};
use crate::api::extractors::{IdPath, ValidatedJson};
use crate::api::types::ApiError;
use crate::data::sqlite::repositories as repo;
use crate::data::types::UserRecord;

use types::{RoleDto, UpdateAvatarRequest, UpdateRolesRequest};

/// Shared state for Users API endpoints
#[derive(Clone)]
pub struct UsersApiState {
    pub pool: SqlitePool,
}

/// Build Users API routes
pub fn routes(auth_manager: Arc<AuthManager>, pool: SqlitePool) -> Router {
    let state = UsersApiState { pool };

    AccessRouter::new(auth_manager)
        .route("/", RouteAccess::PUBLIC, get(list_users))
        .route(
            "/available-roles",
            RouteAccess::AUTHENTICATED,
            get(available_roles),
        )
        .route(
            "/with-follow-status",
            RouteAccess::AUTHENTICATED,
            get(with_follow_status),
        )
        .route("/{id}", RouteAccess::OPTIONAL, get(get_user))
        .route("/{id}/followers", RouteAccess::AUTHENTICATED, get(followers))
        .route("/{id}/following", RouteAccess::AUTHENTICATED, get(following))
        .route(
            "/{id}/follow",
            RouteAccess::AUTHENTICATED,
            post(follow).delete(unfollow),
        )
        .route("/{id}/roles", RouteAccess::AUTHENTICATED, get(get_roles))
        .route("/{id}/roles", RouteAccess::ADMIN, put(update_roles))
        .route("/{id}/avatar", RouteAccess::AUTHENTICATED, put(update_avatar))
        .with_state(state)
}

async fn require_user(pool: &SqlitePool, id: i64) -> Result<UserRecord, ApiError> {
    repo::get_user(pool, id)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

/// Every user except the caller, with whether the caller follows them
async fn users_with_follow_status(
    pool: &SqlitePool,
    caller_id: i64,
) -> Result<Vec<UserDetails>, ApiError> {
    let users = repo::list_users(pool)
        .await
        .map_err(ApiError::from_sqlite)?;
    let following = repo::following_ids(pool, caller_id)
        .await
        .map_err(ApiError::from_sqlite)?;

    Ok(users
        .iter()
        .filter(|r| r.user.id != caller_id)
        .map(|r| details(r, Some(following.contains(&r.user.id))))
        .collect())
}

/// List all users
pub async fn list_users(
    State(state): State<UsersApiState>,
) -> Result<Json<Vec<UserDetails>>, ApiError> {
    let users = repo::list_users(&state.pool)
        .await
        .map_err(ApiError::from_sqlite)?;

    Ok(Json(users.iter().map(|r| details(r, None)).collect()))
}

/// List every defined role
pub async fn available_roles(
    State(state): State<UsersApiState>,
) -> Result<Json<Vec<RoleDto>>, ApiError> {
    let roles = repo::list_roles(&state.pool)
        .await
        .map_err(ApiError::from_sqlite)?;

    Ok(Json(roles.into_iter().map(RoleDto::from).collect()))
}

/// All other users with the caller's follow status
pub async fn with_follow_status(
    State(state): State<UsersApiState>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<Vec<UserDetails>>, ApiError> {
    Ok(Json(users_with_follow_status(&state.pool, caller.id).await?))
}

/// One user, with follow status when the caller is signed in
pub async fn get_user(
    State(state): State<UsersApiState>,
    IdPath(id): IdPath,
    OptionalUser(caller): OptionalUser,
) -> Result<Json<UserDetails>, ApiError> {
    let record = require_user(&state.pool, id).await?;

    let is_following = match caller {
        Some(caller) => Some(
            repo::is_following(&state.pool, caller.id, id)
                .await
                .map_err(ApiError::from_sqlite)?,
        ),
        None => None,
    };

    Ok(Json(details(&record, is_following)))
}

/// Users following `id`, with the caller's follow status for each
pub async fn followers(
    State(state): State<UsersApiState>,
    IdPath(id): IdPath,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<Vec<UserDetails>>, ApiError> {
    require_user(&state.pool, id).await?;

    let followers = repo::list_followers(&state.pool, id)
        .await
        .map_err(ApiError::from_sqlite)?;
    let following = repo::following_ids(&state.pool, caller.id)
        .await
        .map_err(ApiError::from_sqlite)?;

    Ok(Json(
        followers
            .iter()
            .map(|r| details(r, Some(following.contains(&r.user.id))))
            .collect(),
    ))
}

/// Users that `id` follows
pub async fn following(
    State(state): State<UsersApiState>,
    IdPath(id): IdPath,
) -> Result<Json<Vec<UserDetails>>, ApiError> {
    require_user(&state.pool, id).await?;

    let following = repo::list_following(&state.pool, id)
        .await
        .map_err(ApiError::from_sqlite)?;

    Ok(Json(following.iter().map(|r| details(r, None)).collect()))
}

/// Follow a user (idempotent), returning the refreshed user list
pub async fn follow(
    State(state): State<UsersApiState>,
    IdPath(id): IdPath,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<Vec<UserDetails>>, ApiError> {
    if id == caller.id {
        return Err(ApiError::bad_request("Cannot follow yourself"));
    }
    require_user(&state.pool, id).await?;

    let created = repo::follow_user(&state.pool, caller.id, id)
        .await
        .map_err(ApiError::from_sqlite)?;
    if created {
        tracing::debug!(follower_id = caller.id, following_id = id, "Follow created");
    }

    Ok(Json(users_with_follow_status(&state.pool, caller.id).await?))
}

/// Unfollow a user (idempotent), returning the refreshed user list
pub async fn unfollow(
    State(state): State<UsersApiState>,
    IdPath(id): IdPath,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<Vec<UserDetails>>, ApiError> {
    let removed = repo::unfollow_user(&state.pool, caller.id, id)
        .await
        .map_err(ApiError::from_sqlite)?;
    if removed {
        tracing::debug!(follower_id = caller.id, following_id = id, "Follow removed");
    }

    Ok(Json(users_with_follow_status(&state.pool, caller.id).await?))
}

/// Role names held by a user
pub async fn get_roles(
    State(state): State<UsersApiState>,
    IdPath(id): IdPath,
) -> Result<Json<Vec<String>>, ApiError> {
    let record = require_user(&state.pool, id).await?;
    Ok(Json(record.roles.into_iter().map(|r| r.name).collect()))
}

/// Add or remove roles (admin only)
pub async fn update_roles(
    State(state): State<UsersApiState>,
    IdPath(id): IdPath,
    CurrentUser(caller): CurrentUser,
    ValidatedJson(body): ValidatedJson<UpdateRolesRequest>,
) -> Result<Json<UserDetails>, ApiError> {
    require_user(&state.pool, id).await?;

    repo::set_user_roles(&state.pool, id, &body.roles, body.action.into())
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| ApiError::bad_request("One or more roles do not exist"))?;

    tracing::info!(
        admin_id = caller.id,
        user_id = id,
        action = ?body.action,
        roles = ?body.roles,
        "User roles updated"
    );

    let record = require_user(&state.pool, id).await?;
    Ok(Json(details(&record, None)))
}

/// Set or clear a user's avatar path. Callers may change their own avatar;
/// admins may change anyone's.
pub async fn update_avatar(
    State(state): State<UsersApiState>,
    IdPath(id): IdPath,
    CurrentUser(caller): CurrentUser,
    ValidatedJson(body): ValidatedJson<UpdateAvatarRequest>,
) -> Result<Json<UserDetails>, ApiError> {
    if caller.id != id && !caller.is_admin() {
        return Err(ApiError::forbidden("You can only update your own avatar"));
    }
    require_user(&state.pool, id).await?;

    let avatar_path = body
        .avatar_path
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());
    repo::set_avatar_path(&state.pool, id, avatar_path)
        .await
        .map_err(ApiError::from_sqlite)?;

    tracing::debug!(user_id = id, cleared = avatar_path.is_none(), "Avatar updated");

    let record = require_user(&state.pool, id).await?;
    Ok(Json(details(&record, None)))
}
