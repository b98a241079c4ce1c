//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_config` - Ledger configuration (file, then environment)
//! - `cmd_init` - Initialize the database

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use fluxo_core::db::{parse_date, Database};
use fluxo_core::LedgerConfig;

pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    Database::new(path_str).context("Failed to open database")
}

/// Load the config from `path`, FLUXO_CONFIG or the default location, then
/// apply `FLUXO_*` overrides
pub fn load_config(path: Option<&Path>) -> Result<LedgerConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => std::env::var("FLUXO_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| LedgerConfig::default_path()),
    };
    let mut config = LedgerConfig::load(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    config.apply_env();
    Ok(config)
}

/// Parse an optional date argument (YYYY-MM-DD or RFC 3339)
pub fn parse_date_arg(name: &str, value: Option<&str>) -> Result<Option<NaiveDate>> {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => parse_date(s)
            .map(Some)
            .with_context(|| format!("Invalid --{} date: {} (use YYYY-MM-DD)", name, s)),
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    open_db(db_path)?;

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Record a transaction: fluxo transactions add 42.50 -c Food");
    println!("  2. Add a recurring bill: fluxo recurring add 1200 -f monthly -c Rent");
    println!("  3. Start web UI: fluxo serve");

    Ok(())
}
