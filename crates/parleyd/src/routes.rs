//! API routes for parleyd

use crate::server::AppState;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use parley_shared::chat::{ChatRequest, ChatResponse, DatasetListing, HealthResponse};
use parley_shared::dataset::list_files;
use std::sync::Arc;
use tracing::{debug, error, info};

type AppStateArc = Arc<AppState>;

const CHAT_HTML: &str = include_str!("../static/chat.html");

// ============================================================================
// Chat Routes
// ============================================================================

pub fn chat_routes() -> Router<AppStateArc> {
    Router::new().route("/chat", post(chat).layer(DefaultBodyLimit::disable()))
}

/// Always answers 200; a body that isn't a chat request counts as an empty message
async fn chat(State(state): State<AppStateArc>, body: Bytes) -> Json<ChatResponse> {
    let req: ChatRequest = serde_json::from_slice(&body).unwrap_or_else(|e| {
        debug!("Unreadable chat body, treating as empty: {}", e);
        ChatRequest::default()
    });
    info!("[Q]  {}", req.message);

    Json(state.responder.respond(&req.message).await)
}

// ============================================================================
// Dataset Routes
// ============================================================================

pub fn dataset_routes() -> Router<AppStateArc> {
    Router::new().route("/datasets", get(list_datasets))
}

async fn list_datasets(
    State(state): State<AppStateArc>,
) -> Result<Json<DatasetListing>, (StatusCode, String)> {
    let dir = state.responder.dataset_dir().to_path_buf();

    let files = tokio::task::spawn_blocking(move || list_files(&dir))
        .await
        .map_err(|e| {
            error!("  Dataset listing task failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?
        .map_err(|e| {
            error!("  Dataset listing failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    Ok(Json(DatasetListing::new(files)))
}

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/health", get(health_check))
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

// ============================================================================
// UI Routes
// ============================================================================

pub fn ui_routes() -> Router<AppStateArc> {
    Router::new().route("/", get(serve_ui))
}

async fn serve_ui() -> Html<&'static str> {
    Html(CHAT_HTML)
}
