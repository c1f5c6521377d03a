//! HTTP server for parleyd

use crate::composer::Responder;
use crate::config::Config;
use crate::routes;
use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
pub struct AppState {
    pub responder: Responder,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(responder: Responder) -> Self {
        Self {
            responder,
            start_time: Instant::now(),
        }
    }
}

/// Assemble every route around the shared state
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::chat_routes())
        .merge(routes::dataset_routes())
        .merge(routes::health_routes())
        .merge(routes::ui_routes())
        .with_state(Arc::new(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server
pub async fn run(config: &Config) -> Result<()> {
    let responder = Responder::from_config(config)?;
    std::fs::create_dir_all(responder.dataset_dir()).with_context(|| {
        format!("creating dataset directory {}", responder.dataset_dir().display())
    })?;
    info!("  Dataset directory: {}", responder.dataset_dir().display());

    let app = router(AppState::new(responder));

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("  Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
