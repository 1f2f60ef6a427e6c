//! Identity extractors for Axum handlers
//!
//! The gate attaches the verified [`Identity`] to request extensions; these
//! extractors read it back.
//!
//! # Usage
//!
//! ```no_run
//! # use axum::Json;
//! # use micropost_server::api::auth::{CurrentUser, Identity};
//! pub async fn me(CurrentUser(user): CurrentUser) -> Json<Identity> {
//!     Json(user)
//! }
//! ```

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};

use super::identity::Identity;
use crate::api::types::ApiError;

/// Rejection type for identity extractors
pub enum AuthRejection {
    /// No identity in extensions (route not gated as authenticated)
    MissingContext,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::MissingContext => {
                tracing::error!("Identity requested on a route without an authenticated gate");
                ApiError::internal("Auth context not available").into_response()
            }
        }
    }
}

/// Authenticated caller. Use on routes gated as authenticated or admin.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(Self)
            .ok_or(AuthRejection::MissingContext)
    }
}

/// Caller on optional-auth routes, `None` for anonymous requests
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<Identity>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<Identity>().cloned()))
    }
}
