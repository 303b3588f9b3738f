//! Question route: a form-encoded question in, the generated answer out.

use std::sync::Arc;

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tracing::error;

use crate::state::AppState;
use longhorn_chat::types::{AskForm, AskResponse};
use longhorn_core::Error;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/hello", post(ask))
}

/// POST /hello answers `first_name` (the question) against the configured PDF.
///
/// A missing field is rejected by the `Form` extractor before this runs.
async fn ask(State(state): State<Arc<AppState>>, Form(form): Form<AskForm>) -> Response {
    match state
        .pipeline
        .answer(state.document_path(), &form.first_name)
        .await
    {
        Ok(message) => (StatusCode::OK, Json(AskResponse { message })).into_response(),
        Err(e) => {
            error!("Failed to answer question: {}", e);
            (
                status_for(&e),
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::Http(_) | Error::Generation(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
