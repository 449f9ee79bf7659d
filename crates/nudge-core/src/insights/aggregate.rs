//! Category aggregation

use crate::models::Transaction;

use super::types::{CategoryTotals, SpendingSummary};

/// Sum amounts per category and overall
///
/// Negative amounts (refunds) are included as-is.
pub fn summarize(transactions: &[Transaction]) -> SpendingSummary {
    let mut by_category = CategoryTotals::new();
    let mut total = 0.0;

    for tx in transactions {
        by_category.add(tx.category_or_default(), tx.amount);
        total += tx.amount;
    }

    SpendingSummary {
        by_category,
        total,
        transaction_count: transactions.len(),
    }
}
