//! Data models for Nudge

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category label used when a transaction has no category
pub const DEFAULT_CATEGORY: &str = "Other";

/// A stored transaction
///
/// `timestamp` is kept exactly as the client sent it. It is loosely ISO-8601
/// and only interpreted by the timeframe filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub amount: f64,
    #[serde(default)]
    pub category: String,
    pub timestamp: String,
}

impl Transaction {
    /// Category name for aggregation (blank categories become "Other")
    pub fn category_or_default(&self) -> &str {
        let trimmed = self.category.trim();
        if trimmed.is_empty() {
            DEFAULT_CATEGORY
        } else {
            trimmed
        }
    }
}

/// A transaction to be stored (id is assigned by the store)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub amount: f64,
    pub category: String,
    pub timestamp: String,
}

impl NewTransaction {
    /// Create a transaction stamped with the current time
    pub fn now(amount: f64, category: &str) -> Self {
        Self {
            amount,
            category: category.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// Check the fields a client is required to provide
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.amount.is_finite() {
            return Err("amount must be a finite number".to_string());
        }
        if self.category.trim().is_empty() {
            return Err("category must not be empty".to_string());
        }
        if self.timestamp.trim().is_empty() {
            return Err("timestamp must not be empty".to_string());
        }
        Ok(())
    }
}

/// A stored transaction with its insertion time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTransaction {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub created_at: DateTime<Utc>,
}

/// A single spending insight with an actionable tip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub insight: String,
    pub tip: String,
}

impl Insight {
    pub fn new(insight: impl Into<String>, tip: impl Into<String>) -> Self {
        Self {
            insight: insight.into(),
            tip: tip.into(),
        }
    }
}

/// Response body for the insights endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InsightsResponse {
    pub insights: Vec<Insight>,
}
