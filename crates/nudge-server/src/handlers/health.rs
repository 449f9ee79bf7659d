//! Health handler

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;
use nudge_core::ai::{AIBackend, BackendInfo};

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    /// Configured AI backend, or null when running fallback-only
    pub ai_backend: Option<BackendInfo>,
}

/// GET /api/health - Liveness check
///
/// Does not probe the AI backend; a slow model must not make the service
/// look down.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
        ai_backend: state.engine.ai().map(|client| client.info()),
    })
}
