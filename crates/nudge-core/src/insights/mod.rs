//! Insight pipeline
//!
//! Turns a user's recent transactions into a handful of short spending
//! insights. Pattern analysis is delegated to a text-generation model; when
//! the model is unavailable or replies with something unusable, a single
//! deterministic insight about the top spending category is produced
//! instead.
//!
//! ## Stages
//!
//! - [`timeframe`] - trailing window filter, tolerant of mixed timestamp formats
//! - [`aggregate`] - per-category totals
//! - [`fingerprint`] - cache key for a transaction set and window
//! - [`cache`] - time-bounded result cache
//! - [`prompt`] - model instructions
//! - [`fallback`] - deterministic insight from the aggregate
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nudge_core::insights::InsightEngine;
//!
//! let engine = InsightEngine::from_env()?;
//! let insights = engine.analyze(&transactions, "month").await;
//! ```

pub mod aggregate;
pub mod cache;
pub mod engine;
pub mod fallback;
pub mod fingerprint;
pub mod prompt;
pub mod timeframe;
pub mod types;

pub use aggregate::summarize;
pub use cache::{CacheEntry, InsightCache, KeyLocks};
pub use engine::InsightEngine;
pub use fallback::fallback_insights;
pub use fingerprint::fingerprint;
pub use prompt::{build_prompt, system_instructions};
pub use timeframe::{filter_by_timeframe, parse_timestamp};
pub use types::{CategoryTotals, SpendingSummary, Timeframe};
