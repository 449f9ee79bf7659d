//! Timeframe filtering with tolerant timestamp parsing
//!
//! Transactions arrive with loosely formatted ISO-8601 timestamps. A value
//! that cannot be parsed is kept rather than dropped, so a malformed record
//! never silently disappears from an analysis.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use tracing::warn;

use crate::error::{Error, Result};
use crate::models::Transaction;

use super::types::Timeframe;

/// Formats tried for timestamps carrying an explicit offset
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

/// Formats tried for offset-naive timestamps
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a transaction timestamp into UTC
///
/// Precedence:
/// 1. trailing `Z` is read as UTC
/// 2. a `+` or more than two `-` means an explicit offset is present
/// 3. anything else is offset-naive and assumed to be UTC
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let s = raw.trim();

    if let Some(stripped) = s.strip_suffix('Z') {
        return parse_with_offset(&format!("{}+00:00", stripped))
            .ok_or_else(|| Error::TimestampParse(raw.to_string()));
    }

    if s.contains('+') || s.matches('-').count() > 2 {
        return parse_with_offset(s).ok_or_else(|| Error::TimestampParse(raw.to_string()));
    }

    parse_naive(s)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| Error::TimestampParse(raw.to_string()))
}

fn parse_with_offset(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Start of the trailing window ending at `now`
pub fn cutoff(timeframe: Timeframe, now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(timeframe.days())
}

/// Keep transactions on or after the window cutoff, preserving order
///
/// Transactions whose timestamp cannot be parsed are always kept.
pub fn filter_by_timeframe(
    transactions: &[Transaction],
    timeframe: Timeframe,
    now: DateTime<Utc>,
) -> Vec<Transaction> {
    let cutoff = cutoff(timeframe, now);

    transactions
        .iter()
        .filter(|tx| match parse_timestamp(&tx.timestamp) {
            Ok(ts) => ts >= cutoff,
            Err(e) => {
                warn!(id = %tx.id, error = %e, "Keeping transaction with unparseable timestamp");
                true
            }
        })
        .cloned()
        .collect()
}
