//! Core command implementations and shared utilities
//!
//! - `open_db` - Shared utility to open the database
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use nudge_core::db::Database;

/// Open (and migrate) the database at `db_path`
pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .with_context(|| format!("Database path is not valid UTF-8: {}", db_path.display()))?;
    Database::new(path_str).context("Failed to open database")
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path)?;
    let count = db.count_transactions()?;
    if count > 0 {
        println!("   Found {} existing transactions", count);
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Import transactions: nudge import --file transactions.json");
    println!("  2. Get insights: nudge insights --timeframe month");
    println!("  3. Start the API: nudge serve");

    Ok(())
}
