//! Deterministic fallback when the model path fails

use crate::models::{Insight, DEFAULT_CATEGORY};

use super::types::{SpendingSummary, Timeframe};

/// Single insight naming the top spending category
///
/// Never fails. The pipeline only gets here with at least one transaction,
/// but an empty summary still yields a well-formed insight.
pub fn fallback_insights(summary: &SpendingSummary, timeframe: Timeframe) -> Vec<Insight> {
    let (category, amount) = summary
        .by_category
        .top()
        .unwrap_or((DEFAULT_CATEGORY, 0.0));

    vec![Insight::new(
        format!(
            "Your top spending {} is {} at ${:.2}",
            timeframe.description(),
            category,
            amount
        ),
        format!("Consider setting a budget for {}", category),
    )]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::aggregate::summarize;
    use crate::models::Transaction;

    fn tx(amount: f64, category: &str) -> Transaction {
        Transaction {
            id: "x".to_string(),
            amount,
            category: category.to_string(),
            timestamp: "2024-06-10T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_fallback_names_top_category() {
        let summary = summarize(&[tx(100.0, "Food"), tx(50.0, "Travel")]);
        let insights = fallback_insights(&summary, Timeframe::Week);

        assert_eq!(insights.len(), 1);
        assert_eq!(
            insights[0].insight,
            "Your top spending this week is Food at $100.00"
        );
        assert_eq!(insights[0].tip, "Consider setting a budget for Food");
    }

    #[test]
    fn test_fallback_tie_uses_first_category() {
        let summary = summarize(&[tx(30.0, "Travel"), tx(30.0, "Food")]);
        let insights = fallback_insights(&summary, Timeframe::Month);
        assert!(insights[0].insight.contains("this month is Travel at $30.00"));
    }

    #[test]
    fn test_fallback_on_empty_summary_is_well_formed() {
        let insights = fallback_insights(&SpendingSummary::default(), Timeframe::Year);
        assert_eq!(insights.len(), 1);
        assert!(!insights[0].insight.is_empty());
        assert!(!insights[0].tip.is_empty());
    }
}
