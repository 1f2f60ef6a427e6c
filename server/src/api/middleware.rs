//! HTTP middleware (CORS, request log, error envelope, 404 handler)

use std::time::Instant;

use axum::body::{Body, to_bytes};
use axum::extract::Request;
use axum::http::{HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::{SecondsFormat, Utc};
use serde_json::{Value, json};
use tower_http::cors::{AllowOrigin, CorsLayer};

use super::types::{ApiError, reason_phrase};

/// Largest error body the envelope will read back
const MAX_ERROR_BODY: usize = 64 * 1024;

/// Create CORS layer for the configured frontend origin (credentials allowed)
pub fn cors(origin: &str) -> CorsLayer {
    let allow_origin = match origin.parse::<HeaderValue>() {
        Ok(value) => AllowOrigin::exact(value),
        Err(_) => {
            tracing::warn!(origin = %origin, "Invalid CORS origin, cross-origin requests disabled");
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ORIGIN,
            header::CACHE_CONTROL,
        ])
        .allow_credentials(true)
}

/// Log one line per request after the response is produced
pub async fn request_log(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        %method,
        %uri,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        user_agent = %user_agent,
        "request"
    );
    response
}

/// Rewrite every error response into the public error envelope:
///
/// ```json
/// { "success": false, "statusCode": 401, "timestamp": "...", "path": "/auth/me",
///   "message": "Unauthorized",
///   "errorResponse": { "error": "Unauthorized", "message": "No token provided", "statusCode": 401 } }
/// ```
///
/// Bodies that are not a JSON object (framework rejections, empty 405s) get a
/// synthesized `errorResponse`.
pub async fn error_envelope(request: Request, next: Next) -> Response {
    let path = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let response = next.run(request).await;
    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_ERROR_BODY).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read error body");
            Default::default()
        }
    };

    let error_response = match serde_json::from_slice::<Value>(&bytes) {
        Ok(value @ Value::Object(_)) => value,
        _ => {
            let text = String::from_utf8_lossy(&bytes).trim().to_string();
            json!({
                "error": reason_phrase(status),
                "message": if text.is_empty() { reason_phrase(status).to_string() } else { text },
                "statusCode": status.as_u16(),
            })
        }
    };

    let message = error_response
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or(reason_phrase(status))
        .to_string();

    if status.is_server_error() {
        tracing::error!(status = status.as_u16(), path = %path, "Request failed");
    } else {
        let detail = error_response
            .get("message")
            .cloned()
            .unwrap_or(serde_json::Value::Null);
        tracing::debug!(
            status = status.as_u16(),
            path = %path,
            detail = %detail,
            "Request rejected"
        );
    }

    let envelope = json!({
        "success": false,
        "statusCode": status.as_u16(),
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "path": path,
        "message": message,
        "errorResponse": error_response,
    });

    let body = match serde_json::to_vec(&envelope) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize error envelope");
            return Response::from_parts(parts, Body::empty());
        }
    };

    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    Response::from_parts(parts, Body::from(body))
}

/// Handle 404 Not Found for unmatched routes
pub async fn handle_404(req: Request) -> impl IntoResponse {
    tracing::debug!(method = %req.method(), uri = %req.uri(), "[404] No route matched");
    ApiError::not_found(format!("Cannot {} {}", req.method(), req.uri().path()))
}
