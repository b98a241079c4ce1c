//! Budget command implementations

use anyhow::{bail, Result};
use fluxo_core::db::Database;
use fluxo_core::export::format_brl;
use fluxo_core::models::NewBudget;

pub fn cmd_budgets_list(db: &Database, owner: &str) -> Result<()> {
    let budgets = db.list_budgets(owner)?;

    if budgets.is_empty() {
        println!("No budgets set. Add one with:");
        println!("  fluxo budgets set Food 800");
        return Ok(());
    }

    println!();
    println!("💰 Budgets");
    println!("   ─────────────────────────────────────");
    for budget in budgets {
        println!(
            "   #{:<4} {:<20} {:>14} / {}",
            budget.id,
            budget.category,
            format_brl(budget.limit),
            budget.period.as_str()
        );
    }

    Ok(())
}

pub fn cmd_budgets_set(
    db: &Database,
    owner: &str,
    category: &str,
    limit: f64,
    period: &str,
) -> Result<()> {
    let budget = db.upsert_budget(
        owner,
        &NewBudget {
            category: category.trim().to_string(),
            limit,
            period: period.parse()?,
        },
    )?;

    println!(
        "✅ Budget #{} for {}: {} {}",
        budget.id,
        budget.category,
        format_brl(budget.limit),
        budget.period.as_str()
    );
    Ok(())
}

pub fn cmd_budgets_delete(db: &Database, owner: &str, id: i64) -> Result<()> {
    if db.delete_budget(owner, id)? == 0 {
        bail!("Budget {} not found", id);
    }
    println!("🗑️  Deleted budget #{}", id);
    Ok(())
}
