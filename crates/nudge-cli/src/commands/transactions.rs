//! Transaction command implementations

use std::path::Path;

use anyhow::{bail, Context, Result};
use nudge_core::db::Database;
use nudge_core::models::NewTransaction;

use super::truncate;

pub fn cmd_add(
    db: &Database,
    amount: f64,
    category: &str,
    timestamp: Option<&str>,
) -> Result<()> {
    let new_tx = match timestamp {
        Some(ts) => NewTransaction {
            amount,
            category: category.to_string(),
            timestamp: ts.to_string(),
        },
        None => NewTransaction::now(amount, category),
    };

    if let Err(msg) = new_tx.validate() {
        bail!("Invalid transaction: {}", msg);
    }

    let tx = db.create_transaction(&new_tx)?;
    println!(
        "✅ Added transaction {}: ${:.2} in {} ({})",
        tx.id, tx.amount, tx.category, tx.timestamp
    );

    Ok(())
}

pub fn cmd_list(db: &Database, limit: usize) -> Result<()> {
    let transactions = db.list_stored_transactions(Some(limit))?;

    if transactions.is_empty() {
        println!("No transactions found. Add some with:");
        println!("  nudge add --amount 12.50 --category Groceries");
        println!("  nudge import --file transactions.json");
        return Ok(());
    }

    let total = db.count_transactions()?;

    println!();
    println!("📝 Recent Transactions ({} of {})", transactions.len(), total);
    println!("   ─────────────────────────────────────────────────────────────");

    for stored in transactions {
        let tx = stored.transaction;
        let amount_str = if tx.amount < 0.0 {
            format!("\x1b[32m-${:.2}\x1b[0m", tx.amount.abs()) // Green for refunds
        } else {
            format!("\x1b[31m${:.2}\x1b[0m", tx.amount) // Red for spending
        };

        println!(
            "   [{:>4}] {:<25} │ {:>10} │ {}",
            tx.id,
            truncate(&tx.timestamp, 25),
            amount_str,
            truncate(tx.category_or_default(), 30)
        );
    }

    Ok(())
}

pub fn cmd_import(db: &Database, file: &Path) -> Result<()> {
    println!("📥 Importing transactions from {}...", file.display());

    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let transactions: Vec<NewTransaction> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {} as a JSON array of transactions", file.display()))?;

    for (idx, tx) in transactions.iter().enumerate() {
        if let Err(msg) = tx.validate() {
            bail!("Transaction #{} is invalid: {}", idx + 1, msg);
        }
    }

    let imported = db.replace_all_transactions(&transactions)?;
    println!("✅ Imported {} transactions (previous data replaced)", imported);

    let sample = db.list_transactions()?;
    for tx in sample.iter().rev().take(5) {
        println!(
            "   ID: {}, Amount: ${:.2}, Category: {}, Date: {}",
            tx.id, tx.amount, tx.category, tx.timestamp
        );
    }

    Ok(())
}
