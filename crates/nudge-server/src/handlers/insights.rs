//! Insight handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::{AppError, AppState};
use nudge_core::models::InsightsResponse;

/// Query parameters for generating insights
#[derive(Debug, Deserialize)]
pub struct InsightQuery {
    /// Window to analyze: week, month, or year (anything else means a week)
    #[serde(default = "default_timeframe")]
    pub timeframe: String,
}

fn default_timeframe() -> String {
    "week".to_string()
}

/// GET /api/insights - Generate spending insights for the requested window
///
/// Reads every stored transaction and runs the insight pipeline. The
/// pipeline never fails; store errors are the only 500s here.
pub async fn get_insights(
    State(state): State<Arc<AppState>>,
    Query(params): Query<InsightQuery>,
) -> Result<Json<InsightsResponse>, AppError> {
    let transactions = state.db.list_transactions()?;

    let insights = state
        .engine
        .analyze(&transactions, &params.timeframe)
        .await;

    info!(
        timeframe = %params.timeframe,
        transactions = transactions.len(),
        insights = insights.len(),
        "Generated insights"
    );

    Ok(Json(InsightsResponse { insights }))
}
