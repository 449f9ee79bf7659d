//! Cache key derivation
//!
//! Only the first [`FINGERPRINT_SAMPLE`] transactions contribute their id and
//! amount, so deriving a key stays cheap for long histories. An edit that
//! only touches a later transaction (without changing the count) maps to the
//! same key until the cached entry expires.

use sha2::{Digest, Sha256};

use crate::models::Transaction;

use super::types::Timeframe;

/// Number of leading transactions sampled into the key
pub const FINGERPRINT_SAMPLE: usize = 10;

/// Build the raw key material for a transaction set
pub fn fingerprint_source(transactions: &[Transaction], timeframe: Timeframe) -> String {
    let mut data = format!("{}_{}", timeframe.as_str(), transactions.len());
    for tx in transactions.iter().take(FINGERPRINT_SAMPLE) {
        data.push_str(&format!("_{}_{}", tx.id, tx.amount));
    }
    data
}

/// Hex digest identifying a transaction set and timeframe
pub fn fingerprint(transactions: &[Transaction], timeframe: Timeframe) -> String {
    let mut hasher = Sha256::new();
    hasher.update(fingerprint_source(transactions, timeframe).as_bytes());
    hex::encode(hasher.finalize())
}
