//! Nudge Core Library
//!
//! Shared functionality for the Nudge spending-insights service:
//! - Insight pipeline (timeframe filter, aggregation, caching, fallback)
//! - Pluggable AI backends (Ollama, OpenAI-compatible servers, mock)
//! - SQLite transaction store with connection pooling
//! - Pipeline configuration (embedded defaults + override file)

pub mod ai;
pub mod config;
pub mod db;
pub mod error;
pub mod insights;
pub mod models;

/// Test utilities including mock Ollama server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    AIBackend, AIClient, BackendInfo, GenerationRequest, MockBackend, OllamaBackend,
    OpenAICompatibleBackend,
};
pub use config::InsightsConfig;
pub use db::Database;
pub use error::{Error, Result};
pub use insights::{InsightEngine, Timeframe};
pub use models::{Insight, InsightsResponse, NewTransaction, StoredTransaction, Transaction};
