//! Types shared by the insight pipeline stages

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Trailing analysis window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    #[default]
    Week,
    Month,
    Year,
    /// Any unrecognized label: a week-long window described as "this period"
    Period,
}

impl Timeframe {
    /// Parse a user-supplied label, never failing
    ///
    /// Matching is case-insensitive; unknown labels map to `Period`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "week" => Self::Week,
            "month" => Self::Month,
            "year" => Self::Year,
            _ => Self::Period,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
            Self::Period => "period",
        }
    }

    /// Window length in days
    pub fn days(&self) -> i64 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Year => 365,
            Self::Period => 7,
        }
    }

    /// Human phrasing used in prompts and fallback insights
    pub fn description(&self) -> &'static str {
        match self {
            Self::Week => "this week",
            Self::Month => "this month",
            Self::Year => "this year",
            Self::Period => "this period",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_label(s))
    }
}

/// Per-category spend, kept in order of first appearance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryTotals {
    entries: Vec<(String, f64)>,
    index: HashMap<String, usize>,
}

impl CategoryTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an amount to a category, creating it on first use
    pub fn add(&mut self, category: &str, amount: f64) {
        match self.index.get(category) {
            Some(&i) => self.entries[i].1 += amount,
            None => {
                self.index.insert(category.to_string(), self.entries.len());
                self.entries.push((category.to_string(), amount));
            }
        }
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.index.get(category).map(|&i| self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Categories in first-appearance order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(c, a)| (c.as_str(), *a))
    }

    /// Sum of all category totals
    pub fn sum(&self) -> f64 {
        self.entries.iter().map(|(_, a)| a).sum()
    }

    /// Categories by descending spend
    ///
    /// The sort is stable, so equal totals keep first-appearance order.
    pub fn by_descending_spend(&self) -> Vec<(&str, f64)> {
        let mut sorted: Vec<(&str, f64)> = self.iter().collect();
        sorted.sort_by(|a, b| b.1.total_cmp(&a.1));
        sorted
    }

    /// Category with the largest total (first one wins among exact ties)
    pub fn top(&self) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for (category, amount) in self.iter() {
            match best {
                Some((_, best_amount)) if amount <= best_amount => {}
                _ => best = Some((category, amount)),
            }
        }
        best
    }
}

/// Aggregate view of the analyzed transactions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpendingSummary {
    pub by_category: CategoryTotals,
    pub total: f64,
    pub transaction_count: usize,
}
