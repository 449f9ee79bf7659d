//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    static_dir: Option<&Path>,
) -> Result<()> {
    println!("🚀 Starting Nudge web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    let config = nudge_server::ServerConfig::from_env();
    if !config.allowed_origins.is_empty() {
        println!(
            "   🌐 CORS origins: {} ({})",
            config.allowed_origins.join(", "),
            nudge_server::ALLOWED_ORIGINS_ENV
        );
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path)?;

    let static_dir_str = match static_dir {
        Some(p) => Some(
            p.to_str()
                .context("Static directory path must be valid UTF-8")?,
        ),
        None => None,
    };
    nudge_server::serve_with_config(db, host, port, static_dir_str, config).await?;

    Ok(())
}
