//! CLI argument definitions using clap
//!
//! This module contains the clap structs for parsing CLI arguments.
//! The command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Nudge - Short, actionable insights about your spending
#[derive(Parser)]
#[command(name = "nudge")]
#[command(about = "Spending insights from your transaction history", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "nudge.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Record a single transaction
    Add {
        /// Amount spent
        #[arg(short, long, allow_negative_numbers = true)]
        amount: f64,

        /// Spending category (e.g. Groceries)
        #[arg(short, long)]
        category: String,

        /// When the transaction happened (defaults to now, RFC 3339)
        #[arg(short, long)]
        timestamp: Option<String>,
    },

    /// List stored transactions, newest first
    List {
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Replace stored transactions with a JSON array
    ///
    /// Each element needs `amount`, `category` and `timestamp`.
    /// Ids are reassigned as "1".."n" in file order.
    Import {
        /// JSON file to import
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Generate spending insights once and print them
    Insights {
        /// Timeframe to analyze (week, month, year)
        #[arg(short, long, default_value = "week")]
        timeframe: String,

        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory with static files to serve (optional)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}
