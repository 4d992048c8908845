//! User feedback collection.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::info;

use crate::error::ApiError;
use crate::state::SharedState;

pub fn routes() -> Router<SharedState> {
    Router::new().route("/feedback", post(record_feedback))
}

/// POST /feedback: append any JSON payload to the feedback log.
async fn record_feedback(
    State(state): State<SharedState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(entry) = payload.map_err(|e| ApiError::validation(e.body_text()))?;
    state.feedback.append(&entry)?;
    info!("Feedback recorded");
    Ok(Json(json!({ "status": "Feedback recorded" })))
}
