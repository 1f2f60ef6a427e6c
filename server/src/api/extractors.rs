//! Path and validation extractors for API routes
//!
//! Every rejection renders as an [`ApiError`] so it flows through the same
//! error envelope as handler errors.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::ops::Deref;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{ConnectInfo, FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::api::types::ApiError;
use crate::core::constants::UNKNOWN_CLIENT_ADDRESS;

/// Validated numeric ID from the single path parameter of a route.
///
/// Returns 400 Bad Request when the segment is not a positive integer.
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub i64);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Path)?;

        parse_id(&raw)
            .map(Self)
            .ok_or(ValidationRejection::InvalidId)
    }
}

/// Validated numeric IDs from a route with two path parameters, such as
/// `/{id}/comments/{comment_id}`.
#[derive(Debug, Clone, Copy)]
pub struct IdPairPath(pub i64, pub i64);

impl<S> FromRequestParts<S> for IdPairPath
where
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path((first, second)) = Path::<(String, String)>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Path)?;

        match (parse_id(&first), parse_id(&second)) {
            (Some(first), Some(second)) => Ok(Self(first, second)),
            _ => Err(ValidationRejection::InvalidId),
        }
    }
}

/// Parse a positive integer ID
pub fn parse_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id > 0)
}

/// IP address of the connected client.
///
/// Read from the connection info the server is started with; falls back to
/// [`UNKNOWN_CLIENT_ADDRESS`] when it is absent (as in router tests).
#[derive(Debug, Clone)]
pub struct ClientAddress(pub String);

impl<S> FromRequestParts<S> for ClientAddress
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let address = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| UNKNOWN_CLIENT_ADDRESS.to_string());
        Ok(Self(address))
    }
}

/// Validation rejection with structured error response
pub enum ValidationRejection {
    /// Failed to parse path parameters
    Path(PathRejection),
    /// Path ID is not a positive integer
    InvalidId,
    /// Failed to parse query string
    Query(QueryRejection),
    /// Failed to parse JSON body
    Json(JsonRejection),
    /// Validation constraints not satisfied
    Validation(validator::ValidationErrors),
}

impl From<ValidationRejection> for ApiError {
    fn from(rejection: ValidationRejection) -> Self {
        let message = match rejection {
            ValidationRejection::Path(rejection) => rejection.body_text(),
            ValidationRejection::InvalidId => {
                "Validation failed (numeric string is expected)".to_string()
            }
            ValidationRejection::Query(rejection) => rejection.body_text(),
            ValidationRejection::Json(rejection) => rejection.body_text(),
            ValidationRejection::Validation(errors) => format_validation_errors(&errors),
        };
        ApiError::bad_request(message)
    }
}

impl IntoResponse for ValidationRejection {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: validation failed", field))
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

/// Query extractor with automatic validation.
///
/// Deserializes query parameters and validates them using the `validator` crate.
/// Returns a `ValidationRejection` on parse or validation failure.
#[derive(Debug)]
pub struct ValidatedQuery<T>(pub T);

impl<T> Deref for ValidatedQuery<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Query)?;
        value.validate().map_err(ValidationRejection::Validation)?;
        Ok(Self(value))
    }
}

/// JSON body extractor with automatic validation.
///
/// Deserializes JSON body and validates it using the `validator` crate.
/// Returns a `ValidationRejection` on parse or validation failure.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T> Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ValidationRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidationRejection::Json)?;
        value.validate().map_err(ValidationRejection::Validation)?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Body {
        #[validate(length(min = 1, message = "name should not be empty"))]
        name: String,
        #[validate(email(message = "email must be an email"))]
        email: String,
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42"), Some(42));
        assert_eq!(parse_id("0"), None);
        assert_eq!(parse_id("-3"), None);
        assert_eq!(parse_id("abc"), None);
        assert_eq!(parse_id(""), None);
    }

    #[test]
    fn test_invalid_id_is_bad_request() {
        let err = ApiError::from(ValidationRejection::InvalidId);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.message().contains("numeric string"));
    }

    #[test]
    fn test_validation_messages_are_joined() {
        let body = Body {
            name: String::new(),
            email: "nope".to_string(),
        };
        let errors = body.validate().unwrap_err();
        let err = ApiError::from(ValidationRejection::Validation(errors));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.message(),
            "email must be an email; name should not be empty"
        );
    }

    #[tokio::test]
    async fn test_id_pair_path() {
        use axum::Router;
        use axum::routing::get;
        use tower::ServiceExt;

        let app = Router::new().route(
            "/posts/{id}/comments/{comment_id}",
            get(|IdPairPath(post, comment): IdPairPath| async move {
                format!("{post}:{comment}")
            }),
        );

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/posts/3/comments/7")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"3:7");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/posts/3/comments/zero")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_client_address_from_connect_info() {
        let request = Request::builder()
            .uri("/")
            .body(axum::body::Body::empty())
            .unwrap();
        let (mut parts, _) = request.into_parts();
        let ClientAddress(address) = ClientAddress::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(address, UNKNOWN_CLIENT_ADDRESS);

        let mut request = Request::builder()
            .uri("/")
            .body(axum::body::Body::empty())
            .unwrap();
        request.extensions_mut().insert(ConnectInfo(SocketAddr::from((
            [192, 168, 1, 20],
            4000,
        ))));
        let (mut parts, _) = request.into_parts();
        let ClientAddress(address) = ClientAddress::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(address, "192.168.1.20");
    }

    #[tokio::test]
    async fn test_validated_json_rejects_invalid_body() {
        let request = Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(r#"{"name":"","email":"a@b.co"}"#))
            .unwrap();

        let result = ValidatedJson::<Body>::from_request(request, &()).await;
        assert!(matches!(result, Err(ValidationRejection::Validation(_))));
    }

    #[tokio::test]
    async fn test_validated_json_accepts_valid_body() {
        let request = Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(
                r#"{"name":"Test","email":"test@example.com"}"#,
            ))
            .unwrap();

        let ValidatedJson(body) = ValidatedJson::<Body>::from_request(request, &())
            .await
            .ok()
            .unwrap();
        assert_eq!(body.name, "Test");
    }
}
