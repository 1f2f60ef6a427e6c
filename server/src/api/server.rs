//! API server initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use super::auth::AuthManager;
use super::middleware;
use super::routes::{auth, categories, health, microposts, ranking, test, users, views};
use crate::core::CoreApp;
use crate::core::constants::DEFAULT_BODY_LIMIT;

/// Build the full application router.
///
/// The error envelope sits innermost among the global layers so it sees
/// handler errors, extractor rejections, gate rejections and 404s alike.
pub fn build_router(auth_manager: Arc<AuthManager>, cors_origin: &str) -> Router {
    let pool = auth_manager.pool().clone();

    Router::new()
        .route("/health", get(health::health))
        .nest("/auth", auth::routes(auth_manager.clone()))
        .nest("/test", test::routes(auth_manager.clone()))
        .nest("/users", users::routes(auth_manager.clone(), pool.clone()))
        .nest(
            "/microposts",
            microposts::routes(auth_manager.clone(), pool.clone()),
        )
        .nest(
            "/micropost-views",
            views::routes(auth_manager.clone(), pool.clone()),
        )
        .nest(
            "/categories",
            categories::routes(auth_manager.clone(), pool.clone()),
        )
        .nest("/admin", ranking::routes(auth_manager, pool))
        .fallback(middleware::handle_404)
        .layer(axum::middleware::from_fn(middleware::error_envelope))
        .layer(axum::middleware::from_fn(middleware::request_log))
        .layer(CompressionLayer::new())
        .layer(middleware::cors(cors_origin))
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
}

pub struct ApiServer {
    app: CoreApp,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        Self { app }
    }

    /// Returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let Self { app } = self;

        let shutdown = app.shutdown.clone();
        let addr = SocketAddr::new(app.config.server.host.parse()?, app.config.server.port);

        let router = build_router(app.auth.clone(), &app.config.server.cors_origin);

        let listener = TcpListener::bind(addr).await?;
        tracing::info!(
            address = %addr,
            environment = %app.config.environment,
            "Server listening"
        );

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown.wait())
        .await?;

        Ok(app)
    }
}
