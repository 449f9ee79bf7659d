//! Prompt rendering for spending insight generation

use std::fmt::Write;

use super::types::{SpendingSummary, Timeframe};

/// Behavioral instructions sent with every insight request
pub const SYSTEM_INSTRUCTIONS: &[&str] = &[
    "You are a financial advisor. Analyze spending and return JSON array with 'insight' and 'tip' fields.",
    "Be concise and actionable. Focus on patterns and savings opportunities.",
];

/// System instructions as owned strings for a backend request
pub fn system_instructions() -> Vec<String> {
    SYSTEM_INSTRUCTIONS.iter().map(|s| s.to_string()).collect()
}

/// Render the spending report the model is asked to analyze
///
/// Categories are listed by descending spend; equal totals keep the order
/// in which the categories first appeared.
pub fn build_prompt(summary: &SpendingSummary, timeframe: Timeframe) -> String {
    let desc = timeframe.description();
    let mut prompt = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(prompt, "Total spent {}: ${:.2}", desc, summary.total);
    prompt.push_str("By category:\n");
    for (category, amount) in summary.by_category.by_descending_spend() {
        let _ = writeln!(prompt, "  {}: ${:.2}", category, amount);
    }

    let _ = write!(
        prompt,
        "\n\nProvide 3-5 concise insights for spending {} as JSON array with 'insight' and 'tip' fields. Be brief.",
        desc
    );

    prompt
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
    fn test_prompt_layout() {
        let summary = summarize(&[tx(50.0, "Travel"), tx(100.0, "Food"), tx(4.5, "Coffee")]);
        let prompt = build_prompt(&summary, Timeframe::Week);

        let expected = "Total spent this week: $154.50\n\
                        By category:\n  \
                        Food: $100.00\n  \
                        Travel: $50.00\n  \
                        Coffee: $4.50\n\
                        \n\n\
                        Provide 3-5 concise insights for spending this week as JSON array with 'insight' and 'tip' fields. Be brief.";
        assert_eq!(prompt, expected);
    }

    #[test]
    fn test_prompt_uses_period_for_unknown_timeframe() {
        let summary = summarize(&[tx(10.0, "Food")]);
        let prompt = build_prompt(&summary, Timeframe::from_label("sprint"));
        assert!(prompt.starts_with("Total spent this period: $10.00"));
        assert!(prompt.contains("insights for spending this period"));
    }

    #[test]
    fn test_prompt_ties_keep_first_appearance() {
        let summary = summarize(&[tx(20.0, "Books"), tx(20.0, "Games"), tx(5.0, "Apps")]);
        let prompt = build_prompt(&summary, Timeframe::Month);

        let books = prompt.find("Books").unwrap();
        let games = prompt.find("Games").unwrap();
        let apps = prompt.find("Apps").unwrap();
        assert!(books < games && games < apps);
    }

    #[test]
    fn test_negative_totals_render() {
        let summary = summarize(&[tx(-12.0, "Refunds")]);
        let prompt = build_prompt(&summary, Timeframe::Year);
        assert!(prompt.contains("Total spent this year: $-12.00"));
        assert!(prompt.contains("  Refunds: $-12.00\n"));
    }

    #[test]
    fn test_system_instructions() {
        let instructions = system_instructions();
        assert_eq!(instructions.len(), 2);
        assert!(instructions[0].contains("financial advisor"));
        assert!(instructions[1].contains("concise and actionable"));
    }
}
