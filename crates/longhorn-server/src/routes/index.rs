//! Static page and health check.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../../static/index.html");

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
}

/// GET / serves the question form.
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /health reports liveness plus whether the document is already cached.
async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "documentCached": state.pipeline.cache().contains(state.document_path()),
        "embedderAvailable": state.pipeline.embedder().is_available(),
    }))
}
