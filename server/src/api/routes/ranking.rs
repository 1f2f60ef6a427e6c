//! Admin ranking endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::api::auth::{AccessRouter, AuthManager, RouteAccess};
use crate::api::routes::microposts::micropost_dtos;
use crate::api::routes::microposts::types::MicropostDto;
use crate::api::types::ApiError;
use crate::core::constants::{RANKING_LIMIT, RANKING_RECENT_POSTS};
use crate::data::sqlite::repositories as repo;

#[derive(Clone)]
pub struct RankingState {
    pub pool: SqlitePool,
}

/// A category with its post count and latest microposts
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRankingDto {
    pub id: i64,
    pub name: String,
    pub post_count: i64,
    pub recent_posts: Vec<MicropostDto>,
}

pub fn routes(auth_manager: Arc<AuthManager>, pool: SqlitePool) -> Router {
    AccessRouter::new(auth_manager)
        .route("/ranking", RouteAccess::ADMIN, get(ranking))
        .route("/ranking/most-view", RouteAccess::ADMIN, get(most_viewed))
        .route("/ranking/category", RouteAccess::ADMIN, get(category_ranking))
        .with_state(RankingState { pool })
}

/// Most liked microposts with their authors
pub async fn ranking(
    State(state): State<RankingState>,
) -> Result<Json<Vec<MicropostDto>>, ApiError> {
    let rows = repo::top_liked(&state.pool, RANKING_LIMIT)
        .await
        .map_err(ApiError::from_sqlite)?;

    Ok(Json(micropost_dtos(&state.pool, rows).await?))
}

/// Most viewed microposts
pub async fn most_viewed(
    State(state): State<RankingState>,
) -> Result<Json<Vec<MicropostDto>>, ApiError> {
    let rows = repo::top_viewed(&state.pool, RANKING_LIMIT)
        .await
        .map_err(ApiError::from_sqlite)?;

    Ok(Json(micropost_dtos(&state.pool, rows).await?))
}

/// Categories holding the most microposts
pub async fn category_ranking(
    State(state): State<RankingState>,
) -> Result<Json<Vec<CategoryRankingDto>>, ApiError> {
    let ranked = repo::category_ranking(&state.pool, RANKING_LIMIT)
        .await
        .map_err(ApiError::from_sqlite)?;

    let mut entries = Vec::with_capacity(ranked.len());
    for (category, post_count) in ranked {
        let recent =
            repo::list_microposts_for_category(&state.pool, category.id, Some(RANKING_RECENT_POSTS))
                .await
                .map_err(ApiError::from_sqlite)?;

        entries.push(CategoryRankingDto {
            id: category.id,
            name: category.name,
            post_count,
            recent_posts: micropost_dtos(&state.pool, recent).await?,
        });
    }

    Ok(Json(entries))
}
