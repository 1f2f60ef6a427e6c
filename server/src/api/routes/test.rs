//! Gate check endpoints, one per admission policy

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::api::auth::{AccessRouter, AuthManager, CurrentUser, RouteAccess};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_data: Option<&'static str>,
}

pub fn routes(auth_manager: Arc<AuthManager>) -> Router {
    AccessRouter::new(auth_manager)
        .route("/public", RouteAccess::PUBLIC, get(public))
        .route("/protected", RouteAccess::AUTHENTICATED, get(protected))
        .route("/profile", RouteAccess::AUTHENTICATED, get(profile))
        .route("/admin", RouteAccess::ADMIN, get(admin))
        .with_state(())
}

pub async fn public() -> &'static str {
    "This is a public route"
}

pub async fn protected() -> &'static str {
    "This is a protected route"
}

pub async fn profile(CurrentUser(user): CurrentUser) -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: format!("Welcome {}!", user.name),
        secret_data: None,
    })
}

pub async fn admin(CurrentUser(user): CurrentUser) -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: format!("Welcome Admin {}!", user.name),
        secret_data: Some("This is confidential information."),
    })
}
