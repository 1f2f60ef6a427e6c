//! Category API endpoints

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use sqlx::SqlitePool;

use crate::api::auth::{AccessRouter, AuthManager, RouteAccess};
use crate::api::extractors::{IdPath, ValidatedJson};
use crate::api::routes::microposts::micropost_dtos;
use crate::api::types::ApiError;
use crate::data::sqlite::repositories as repo;

use types::{CategoryDetailDto, CategoryDto, CreateCategoryRequest};

/// Shared state for Category API endpoints
#[derive(Clone)]
pub struct CategoriesApiState {
    pub pool: SqlitePool,
}

/// Build Category API routes
pub fn routes(auth_manager: Arc<AuthManager>, pool: SqlitePool) -> Router {
    let state = CategoriesApiState { pool };

    AccessRouter::new(auth_manager)
        .route(
            "/",
            RouteAccess::AUTHENTICATED,
            get(list_categories).post(create_category),
        )
        .route("/{id}", RouteAccess::AUTHENTICATED, get(get_category))
        .with_state(state)
}

pub async fn list_categories(
    State(state): State<CategoriesApiState>,
) -> Result<Json<Vec<CategoryDto>>, ApiError> {
    let rows = repo::list_categories(&state.pool)
        .await
        .map_err(ApiError::from_sqlite)?;

    Ok(Json(rows.into_iter().map(CategoryDto::from).collect()))
}

/// Create a category. Names are trimmed and must be unique.
pub async fn create_category(
    State(state): State<CategoriesApiState>,
    ValidatedJson(body): ValidatedJson<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryDto>), ApiError> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("name should not be empty"));
    }

    let row = repo::create_category(&state.pool, name)
        .await
        .map_err(ApiError::from_sqlite)?;

    Ok((StatusCode::CREATED, Json(CategoryDto::from(row))))
}

/// One category with its microposts, newest first
pub async fn get_category(
    State(state): State<CategoriesApiState>,
    IdPath(id): IdPath,
) -> Result<Json<CategoryDetailDto>, ApiError> {
    let category = repo::get_category(&state.pool, id)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| ApiError::not_found(format!("Category with ID {id} not found")))?;

    let rows = repo::list_microposts_for_category(&state.pool, id, None)
        .await
        .map_err(ApiError::from_sqlite)?;

    Ok(Json(CategoryDetailDto {
        category: CategoryDto::from(category),
        microposts: micropost_dtos(&state.pool, rows).await?,
    }))
}
