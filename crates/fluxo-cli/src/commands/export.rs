//! CSV export command

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use fluxo_core::db::{Database, TransactionFilter};
use fluxo_core::LedgerConfig;

use super::parse_date_arg;

pub fn cmd_export(
    db: &Database,
    owner: &str,
    output: Option<&Path>,
    from: Option<&str>,
    to: Option<&str>,
    config: &LedgerConfig,
) -> Result<()> {
    let filter = TransactionFilter::new(owner)
        .since(parse_date_arg("from", from)?)
        .until(parse_date_arg("to", to)?);

    let csv = db.export_transactions_csv(filter, config.fetch_limit)?;

    match output {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            file.write_all(csv.as_bytes())?;

            let rows = csv.lines().count().saturating_sub(1);
            println!("✅ Exported {} transactions to {}", rows, path.display());
        }
        None => {
            print!("{}", csv);
        }
    }

    Ok(())
}
