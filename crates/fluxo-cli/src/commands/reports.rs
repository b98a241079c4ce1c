//! Report command implementations

use anyhow::Result;
use chrono::Utc;
use fluxo_core::db::Database;
use fluxo_core::export::format_brl;
use fluxo_core::models::PeriodStats;
use fluxo_core::tips::TipsResponse;
use fluxo_core::window::Period;
use fluxo_core::{AIClient, LedgerConfig, TextGenerator};

use super::truncate;

fn print_totals(stats: &PeriodStats) {
    println!("   Income:   {:>16}", format_brl(stats.total_income));
    println!("   Expenses: {:>16}", format_brl(stats.total_expense));
    println!("   Balance:  {:>16}", format_brl(stats.balance));
}

pub fn signed_percent(value: f64) -> String {
    if value > 0.0 {
        format!("\x1b[32m+{:.1}%\x1b[0m", value)
    } else if value < 0.0 {
        format!("\x1b[31m{:.1}%\x1b[0m", value)
    } else {
        "0.0%".to_string()
    }
}

/// Absolute currency delta with an explicit sign, green up and red down
pub fn signed_amount(value: f64) -> String {
    if value >= 0.005 {
        format!("\x1b[32m+{}\x1b[0m", format_brl(value))
    } else if value <= -0.005 {
        format!("\x1b[31m{}\x1b[0m", format_brl(value))
    } else {
        format_brl(0.0)
    }
}

pub fn cmd_stats(db: &Database, owner: &str, period: &str, config: &LedgerConfig) -> Result<()> {
    let period: Period = period.parse()?;
    let stats = db.period_stats(owner, period, Utc::now(), config)?;

    println!();
    println!("📊 Statistics for the current {}", period);
    println!("   ─────────────────────────────────");
    print_totals(&stats);
    println!("   Entries:  {:>16}", stats.transactions.len());

    if stats.skipped_records > 0 {
        println!();
        println!(
            "   ⚠️  {} stored record(s) with an unreadable date were skipped",
            stats.skipped_records
        );
    }

    Ok(())
}

pub fn cmd_categories(db: &Database, owner: &str, config: &LedgerConfig) -> Result<()> {
    let categories = db.category_stats(owner, Utc::now(), config)?;

    if categories.is_empty() {
        println!("No expenses recorded this month.");
        return Ok(());
    }

    println!();
    println!("🏷️  Spending by Category (this month)");
    println!("   ─────────────────────────────────────────────────────────────");

    for cat in &categories {
        let budget = match (cat.budget_limit, cat.remaining) {
            (Some(limit), Some(remaining)) if remaining < 0.0 => format!(
                "\x1b[31mover {} limit by {}\x1b[0m",
                format_brl(limit),
                format_brl(-remaining)
            ),
            (Some(limit), Some(remaining)) => {
                format!("{} left of {}", format_brl(remaining), format_brl(limit))
            }
            _ => String::new(),
        };
        println!(
            "   {:<20} {:>14} {:>6.1}%  {}",
            truncate(&cat.category, 20),
            format_brl(cat.total),
            cat.percentage,
            budget
        );
    }

    Ok(())
}

pub fn cmd_compare(db: &Database, owner: &str, config: &LedgerConfig) -> Result<()> {
    let comparison = db.month_comparison(owner, Utc::now(), config)?;

    println!();
    println!("📈 This month vs last month");
    println!("   ─────────────────────────────────");
    println!("   This month:");
    print_totals(&comparison.current_period);
    println!("   Last month:");
    print_totals(&comparison.previous_period);
    println!();
    println!("   Income change:  {}", signed_percent(comparison.income_change));
    println!("   Expense change: {}", signed_percent(comparison.expense_change));
    println!("   Balance change: {}", signed_amount(comparison.balance_change));

    Ok(())
}

pub async fn cmd_tips(db: &Database, owner: &str, period: &str, config: &LedgerConfig) -> Result<()> {
    let period: Period = period.parse()?;
    let stats = db.period_stats(owner, period, Utc::now(), config)?;

    let response = match AIClient::from_env() {
        Some(ai) => {
            println!("💡 Asking {} ({}) for tips...", ai.model(), ai.host());
            fluxo_core::generate_tips(&ai, period, stats, config).await
        }
        None => {
            println!("⚠️  No text generator configured (set OLLAMA_HOST or AI_BACKEND)");
            TipsResponse::fallback(stats, config)
        }
    };

    println!();
    println!("💡 Tips for the current {}", period);
    println!("   ─────────────────────────────────");
    print_totals(&response.stats);
    println!();
    println!("{}", response.tips);

    Ok(())
}
