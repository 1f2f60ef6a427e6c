//! Authentication API endpoints

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::auth::{AccessRouter, AuthError, AuthManager, CurrentUser, Identity, RouteAccess};
use crate::api::extractors::ValidatedJson;
use crate::api::types::ApiError;
use crate::core::constants::AUTH_BODY_LIMIT;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    #[validate(email(message = "email must be an email"))]
    pub email: String,
    #[validate(length(min = 1, message = "password should not be empty"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "email should not be empty"))]
    pub email: String,
    #[validate(length(min = 1, message = "password should not be empty"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub token: String,
    pub user: Identity,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Auth routes state
#[derive(Clone)]
pub struct AuthRoutesState {
    pub auth_manager: Arc<AuthManager>,
}

/// Create auth routes
pub fn routes(auth_manager: Arc<AuthManager>) -> Router {
    let state = AuthRoutesState {
        auth_manager: auth_manager.clone(),
    };

    AccessRouter::new(auth_manager)
        .route("/register", RouteAccess::PUBLIC, post(register))
        .route("/login", RouteAccess::PUBLIC, post(login))
        .route("/logout", RouteAccess::AUTHENTICATED, post(logout))
        .route("/me", RouteAccess::AUTHENTICATED, get(me))
        .with_state(state)
        .layer(DefaultBodyLimit::max(AUTH_BODY_LIMIT))
}

/// Register a new account and sign it in
pub async fn register(
    State(state): State<AuthRoutesState>,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), ApiError> {
    let user = state
        .auth_manager
        .register(&request.name, &request.email, &request.password)
        .await?;
    let token = state.auth_manager.issue_token(&user)?;
    let cookie = state.auth_manager.token_cookie(token.clone());

    Ok((
        StatusCode::CREATED,
        jar.add(cookie),
        Json(AuthResponse {
            message: "Registration successful",
            token,
            user,
        }),
    ))
}

/// Exchange email and password for a token cookie
pub async fn login(
    State(state): State<AuthRoutesState>,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), ApiError> {
    let user = state
        .auth_manager
        .authenticate(&request.email, &request.password)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;
    let token = state.auth_manager.issue_token(&user)?;
    let cookie = state.auth_manager.token_cookie(token.clone());

    tracing::debug!(user_id = user.id, "User logged in");

    Ok((
        StatusCode::CREATED,
        jar.add(cookie),
        Json(AuthResponse {
            message: "Login successful",
            token,
            user,
        }),
    ))
}

/// Logout - clear the token cookie
pub async fn logout(
    State(state): State<AuthRoutesState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> (StatusCode, CookieJar, Json<MessageResponse>) {
    tracing::debug!(user_id = user.id, "User logged out");
    (
        StatusCode::CREATED,
        state.auth_manager.clear_token(jar),
        Json(MessageResponse {
            message: "Logout successful",
        }),
    )
}

/// The caller's identity
pub async fn me(CurrentUser(user): CurrentUser) -> Json<Identity> {
    Json(user)
}
