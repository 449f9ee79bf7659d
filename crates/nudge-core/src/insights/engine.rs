//! Insight Engine - orchestrates the insight pipeline
//!
//! filter -> summarize -> fingerprint -> cache -> prompt -> model -> parse,
//! with the deterministic fallback standing in whenever the model call or
//! parsing fails.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::ai::{parse_insights, AIBackend, AIClient, GenerationRequest};
use crate::config::InsightsConfig;
use crate::error::{Error, Result};
use crate::models::{Insight, Transaction};

use super::aggregate::summarize;
use super::cache::{InsightCache, KeyLocks};
use super::fallback::fallback_insights;
use super::fingerprint::fingerprint;
use super::prompt::{build_prompt, system_instructions};
use super::timeframe::filter_by_timeframe;
use super::types::{SpendingSummary, Timeframe};

/// The insight pipeline
///
/// One engine is shared by every request; the cache it owns is process-wide.
pub struct InsightEngine {
    ai: Option<AIClient>,
    cache: InsightCache,
    locks: KeyLocks,
    model_timeout: Duration,
}

impl InsightEngine {
    /// Create an engine with default tuning
    ///
    /// With no AI client every request is answered by the fallback.
    pub fn new(ai: Option<AIClient>) -> Self {
        Self::with_config(ai, &InsightsConfig::default())
    }

    /// Create an engine with explicit tuning
    pub fn with_config(ai: Option<AIClient>, config: &InsightsConfig) -> Self {
        Self {
            ai,
            cache: InsightCache::new(config.cache_ttl, config.cache_max_entries),
            locks: KeyLocks::new(),
            model_timeout: config.model_timeout,
        }
    }

    /// Create from environment (`AI_BACKEND` etc.) and the config file
    pub fn from_env() -> Result<Self> {
        let config = InsightsConfig::load()?;
        let ai = AIClient::from_env();
        match &ai {
            Some(client) => info!(
                backend = client.kind(),
                model = client.model(),
                host = client.host(),
                "Insight engine using AI backend"
            ),
            None => info!("No AI backend configured, insights will use the fallback"),
        }
        Ok(Self::with_config(ai, &config))
    }

    /// The configured AI client, if any
    pub fn ai(&self) -> Option<&AIClient> {
        self.ai.as_ref()
    }

    /// The result cache
    pub fn cache(&self) -> &InsightCache {
        &self.cache
    }

    /// Produce insights for `transactions` over the window named by `timeframe`
    ///
    /// Never fails: an empty list is returned only when no transaction falls
    /// inside the window.
    pub async fn analyze(&self, transactions: &[Transaction], timeframe: &str) -> Vec<Insight> {
        self.analyze_at(transactions, timeframe, Utc::now()).await
    }

    /// [`analyze`](Self::analyze) with an explicit notion of "now"
    ///
    /// `now` sets the window cutoff and the instant the request started.
    /// Cache lookups and inserts use `now` plus the time spent since, so a
    /// slow model call does not age the entry it produces.
    pub async fn analyze_at(
        &self,
        transactions: &[Transaction],
        timeframe: &str,
        now: DateTime<Utc>,
    ) -> Vec<Insight> {
        let started = Instant::now();
        let timeframe = Timeframe::from_label(timeframe);

        let filtered = filter_by_timeframe(transactions, timeframe, now);
        if filtered.is_empty() {
            debug!(
                timeframe = timeframe.as_str(),
                total = transactions.len(),
                "No transactions in window"
            );
            return Vec::new();
        }

        let summary = summarize(&filtered);
        let key = fingerprint(&filtered, timeframe);

        let Some(ai) = &self.ai else {
            return fallback_insights(&summary, timeframe);
        };

        // Concurrent requests for the same key wait here and then hit the cache
        let _guard = self.locks.lock(&key).await;

        if let Some(cached) = self.cache.get_at(&key, elapsed_since(now, started)).await {
            debug!(key = %key, "Insight cache hit");
            return cached;
        }

        info!(
            key = %key,
            timeframe = timeframe.as_str(),
            transactions = filtered.len(),
            "Insight cache miss, asking model"
        );

        match self.generate(ai, &summary, timeframe).await {
            Ok(insights) => {
                self.cache
                    .put_at(&key, insights.clone(), elapsed_since(now, started))
                    .await;
                insights
            }
            Err(e) if e.is_model_failure() => {
                warn!(error = %e, "Model unavailable, using fallback");
                fallback_insights(&summary, timeframe)
            }
            Err(e) => {
                warn!(error = %e, "Unusable model reply, using fallback");
                fallback_insights(&summary, timeframe)
            }
        }
    }

    async fn generate(
        &self,
        ai: &AIClient,
        summary: &SpendingSummary,
        timeframe: Timeframe,
    ) -> Result<Vec<Insight>> {
        let request = GenerationRequest::new(system_instructions(), build_prompt(summary, timeframe));

        let text = tokio::time::timeout(self.model_timeout, ai.generate(&request))
            .await
            .map_err(|_| Error::ModelTimeout(self.model_timeout.as_secs()))??;

        parse_insights(&text)
    }
}

/// `now` advanced by the time elapsed since `started`
fn elapsed_since(now: DateTime<Utc>, started: Instant) -> DateTime<Utc> {
    chrono::Duration::from_std(started.elapsed())
        .map(|d| now + d)
        .unwrap_or(now)
}
