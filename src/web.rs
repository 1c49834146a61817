use anyhow::{Context, Result};
use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api::{self, AppState};
use crate::config::AppConfig;
use crate::upstream::UpstreamClient;

/// Build the full application router
pub fn app(config: &AppConfig, state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/", get(root))
        .nest("/api", api::router(state));

    if let Some(dir) = &config.server.static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(TraceLayer::new_for_http()).layer(cors)
}

async fn root() -> &'static str {
    "Backend is running"
}

pub async fn run(config: AppConfig) -> Result<()> {
    let upstream = UpstreamClient::new(&config.upstream)?;
    let app = app(&config, AppState::new(upstream));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://localhost:{}", config.server.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server stopped unexpectedly")?;

    tracing::info!("Web server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
