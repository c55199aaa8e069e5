//! HTTP surface: the read-only JSON API under `/api`, the HTML pages and a
//! liveness probe.

pub mod api;
pub mod error;
pub mod pages;
pub mod state;

use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::db::Database;

pub use error::ApiError;
pub use state::AppState;

pub fn router(state: AppState, cors_allow_any_origin: bool) -> Router {
    let api = Router::new()
        .route("/galleries", get(api::list_galleries))
        .route("/gallery/:id", get(api::gallery_detail))
        .route("/tags", get(api::list_tags))
        .route("/profile/:id", get(api::profile))
        .route("/download", get(api::download));

    let mut app = Router::new()
        .route("/", get(pages::index))
        .route("/gallery/:id", get(pages::gallery))
        .route("/profile/:id", get(pages::profile))
        .route("/health", get(|| async { "ok" }))
        .nest("/api", api)
        .fallback(pages::not_found)
        .layer(TraceLayer::new_for_http());

    if cors_allow_any_origin {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE])
            .max_age(Duration::from_secs(60 * 60));
        app = app.layer(cors);
    }

    app.with_state(state)
}

/// Serve until Ctrl+C or SIGTERM.
pub async fn serve(config: &ServerConfig, db: Database) -> Result<()> {
    let app = router(AppState::new(db), config.cors_allow_any_origin);

    let address = config.address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Server running on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::seeded;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    fn preflight() -> Request<Body> {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/tags")
            .header(header::ORIGIN, "https://example.com")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_cors_enabled() {
        let app = router(AppState::new(seeded()), true);
        let response = app.oneshot(preflight()).await.unwrap();
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn test_cors_disabled_by_default() {
        let app = router(AppState::new(seeded()), false);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/tags")
                    .header(header::ORIGIN, "https://example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!response.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }
}
