//! Liveness endpoint

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppError, AppState};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /health - Report that the server is up and its data directory is reachable
pub async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>, AppError> {
    std::fs::metadata(state.conversation.store().data_dir())?;
    Ok(Json(HealthResponse { status: "ok" }))
}
