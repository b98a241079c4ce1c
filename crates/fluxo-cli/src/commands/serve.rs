//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use fluxo_core::LedgerConfig;
use fluxo_server::ServerConfig;

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_auth: bool,
    config: LedgerConfig,
) -> Result<()> {
    println!("🚀 Starting Fluxo web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);

    // Parse allowed CORS origins from environment (comma-separated)
    let allowed_origins =
        fluxo_server::parse_origins(&std::env::var("FLUXO_CORS_ORIGINS").unwrap_or_default());

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - every request acts as the local owner");
    } else {
        println!("   🔒 Owner header required: {}", fluxo_server::OWNER_HEADER);
    }
    if !allowed_origins.is_empty() {
        println!("   🌐 CORS origins: {}", allowed_origins.join(", "));
    }
    if config.sweep.interval_minutes > 0 {
        println!(
            "   🔁 Recurring sweep: every {} minutes",
            config.sweep.interval_minutes
        );
    }
    println!();

    let db = open_db(db_path)?;

    let server_config = ServerConfig {
        require_auth: !no_auth,
        allowed_origins,
    };

    fluxo_server::serve_with_config(db, host, port, server_config, config)
        .await
        .context("Server error")
}
