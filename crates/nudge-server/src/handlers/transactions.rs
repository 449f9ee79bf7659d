//! Transaction handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, warn};

use crate::{AppError, AppState};
use nudge_core::models::{NewTransaction, Transaction};

/// POST /api/transactions - Record a transaction
///
/// Returns 201 with the stored transaction, or 400 when the body is
/// malformed or fails validation.
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewTransaction>, JsonRejection>,
) -> Result<(StatusCode, Json<Transaction>), AppError> {
    let Json(new_tx) = body.map_err(|e| {
        warn!(error = %e, "Rejected transaction body");
        AppError::bad_request(&e.body_text())
    })?;

    new_tx.validate().map_err(|msg| AppError::bad_request(&msg))?;

    let transaction = state.db.create_transaction(&new_tx)?;
    info!(id = %transaction.id, category = %transaction.category, "Created transaction");

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// GET /api/transactions - List all transactions, newest first
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let transactions = state.db.list_transactions()?;
    Ok(Json(transactions))
}

/// GET /api/transactions/:id - Get a single transaction
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Transaction>, AppError> {
    let transaction = state
        .db
        .get_transaction(&id)?
        .ok_or_else(|| AppError::not_found("Transaction not found"))?;

    Ok(Json(transaction))
}
