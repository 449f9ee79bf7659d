//! Insight command implementation

use anyhow::Result;
use nudge_core::ai::AIBackend;
use nudge_core::db::Database;
use nudge_core::insights::{InsightEngine, Timeframe};
use nudge_core::models::{Insight, InsightsResponse};

pub async fn cmd_insights(db: &Database, timeframe: &str, json: bool) -> Result<()> {
    let engine = InsightEngine::from_env()?;
    run_insights(db, &engine, timeframe, json).await
}

/// Run the pipeline once against every stored transaction and print the result
pub async fn run_insights(
    db: &Database,
    engine: &InsightEngine,
    timeframe: &str,
    json: bool,
) -> Result<()> {
    let transactions = db.list_transactions()?;

    if !json {
        match engine.ai() {
            Some(client) => println!(
                "🤖 Analyzing {} transactions with {} (model: {})...",
                transactions.len(),
                client.kind(),
                client.model()
            ),
            None => println!(
                "📊 Analyzing {} transactions (no AI backend configured, using summary rules)...",
                transactions.len()
            ),
        }
    }

    let insights = engine.analyze(&transactions, timeframe).await;
    print_insights(&insights, timeframe, json)
}

fn print_insights(insights: &[Insight], timeframe: &str, json: bool) -> Result<()> {
    if json {
        let response = InsightsResponse {
            insights: insights.to_vec(),
        };
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    let period = Timeframe::from_label(timeframe).description();
    if insights.is_empty() {
        println!("No spending recorded {}.", period);
        return Ok(());
    }

    println!();
    println!("💡 Insights for {}", period);
    println!("   ─────────────────────────────────────────────────────────────");
    for (idx, insight) in insights.iter().enumerate() {
        println!("   {}. {}", idx + 1, insight.insight);
        println!("      → {}", insight.tip);
    }

    Ok(())
}
