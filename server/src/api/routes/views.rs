//! Micropost view counter endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::api::auth::{AccessRouter, AuthManager, RouteAccess};
use crate::api::extractors::{ClientAddress, IdPath};
use crate::api::types::ApiError;
use crate::data::sqlite::repositories as repo;

#[derive(Clone)]
pub struct ViewsState {
    pub pool: SqlitePool,
}

#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub success: bool,
    pub message: &'static str,
}

pub fn routes(auth_manager: Arc<AuthManager>, pool: SqlitePool) -> Router {
    AccessRouter::new(auth_manager)
        .route("/{id}", RouteAccess::PUBLIC, post(record_view))
        .with_state(ViewsState { pool })
}

/// Count a view of a micropost, once per client address
pub async fn record_view(
    State(state): State<ViewsState>,
    IdPath(id): IdPath,
    ClientAddress(address): ClientAddress,
) -> Result<(StatusCode, Json<ViewResponse>), ApiError> {
    if repo::get_micropost(&state.pool, id)
        .await
        .map_err(ApiError::from_sqlite)?
        .is_none()
    {
        return Err(ApiError::not_found(format!("Micropost with ID {id} not found")));
    }

    let recorded = repo::record_view(&state.pool, id, &address)
        .await
        .map_err(ApiError::from_sqlite)?;

    tracing::debug!(micropost_id = id, recorded, "Micropost view");
    let message = if recorded {
        "View recorded successfully"
    } else {
        "View already recorded"
    };
    Ok((
        StatusCode::CREATED,
        Json(ViewResponse {
            success: true,
            message,
        }),
    ))
}
