//! Nudge CLI - Spending insights
//!
//! Usage:
//!   nudge init                          Initialize database
//!   nudge add --amount 12.5 --category Food
//!   nudge import --file transactions.json
//!   nudge insights --timeframe month    Print insights
//!   nudge serve --port 3000             Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Add {
            amount,
            category,
            timestamp,
        } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_add(&db, amount, &category, timestamp.as_deref())
        }
        Commands::List { limit } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_list(&db, limit)
        }
        Commands::Import { file } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_import(&db, &file)
        }
        Commands::Insights { timeframe, json } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_insights(&db, &timeframe, json).await
        }
        Commands::Serve {
            port,
            host,
            static_dir,
        } => commands::cmd_serve(&cli.db, &host, port, static_dir.as_deref()).await,
    }
}
