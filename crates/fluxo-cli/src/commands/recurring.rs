//! Recurring definition commands and the sweep

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Weekday};
use fluxo_core::db::Database;
use fluxo_core::export::format_brl;
use fluxo_core::models::{NewTransaction, RecurrenceRule};
use fluxo_core::LedgerConfig;

use super::{colored_amount, parse_date_arg, today, truncate};

/// Fields for `recurring add`
#[derive(Debug)]
pub struct RecurringOptions {
    pub amount: f64,
    pub frequency: String,
    pub kind: String,
    pub category: String,
    pub description: String,
    pub start: Option<String>,
    pub weekdays: Option<String>,
    pub day: Option<u32>,
    pub until: Option<String>,
}

/// Parse a comma-separated weekday list ("mon,thu" or "monday, thursday")
pub fn parse_weekdays(input: &str) -> Result<Vec<Weekday>> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<Weekday>()
                .map_err(|_| anyhow!("Unknown weekday: {} (use mon, tue, wed, thu, fri, sat, sun)", s))
        })
        .collect()
}

pub fn cmd_recurring_list(db: &Database, owner: &str) -> Result<()> {
    let definitions = db.list_recurring(owner)?;

    if definitions.is_empty() {
        println!("No recurring transactions. Create one with:");
        println!("  fluxo recurring add 1200 -f monthly -c Rent");
        return Ok(());
    }

    println!();
    println!("🔁 Recurring Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    for def in definitions {
        let selector = match (&def.weekdays, def.day_of_month) {
            (Some(days), _) => days
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join(","),
            (None, Some(day)) => format!("day {}", day),
            (None, None) => String::new(),
        };
        let status = if def.active { "active" } else { "cancelled" };
        let until = def
            .end_date
            .map(|d| format!(" until {}", d))
            .unwrap_or_default();

        println!(
            "   #{:<4} {:<8} {:<10} │ {:>22} │ {} ({}) from {}{} [{}]",
            def.id,
            def.frequency,
            selector,
            colored_amount(def.kind, def.amount),
            truncate(&def.description, 30),
            def.category,
            def.start_date,
            until,
            status
        );
    }

    Ok(())
}

pub fn cmd_recurring_add(
    db: &Database,
    owner: &str,
    opts: &RecurringOptions,
    config: &LedgerConfig,
) -> Result<()> {
    let tx = NewTransaction {
        amount: opts.amount,
        kind: opts.kind.parse()?,
        date: parse_date_arg("start", opts.start.as_deref())?.unwrap_or_else(today),
        category: opts.category.trim().to_string(),
        description: opts.description.trim().to_string(),
        has_reminder: false,
    };
    let rule = RecurrenceRule {
        frequency: opts.frequency.parse()?,
        weekdays: opts.weekdays.as_deref().map(parse_weekdays).transpose()?,
        day_of_month: opts.day,
        end_date: parse_date_arg("until", opts.until.as_deref())?,
    };

    let (def, first) = db.create_recurring(owner, &tx, &rule, &config.recurring_suffix)?;

    println!(
        "✅ Created {} recurring #{} ({})",
        def.frequency,
        def.id,
        format_brl(def.amount)
    );
    println!(
        "   First occurrence: #{} on {} \"{}\"",
        first.id, first.date, first.description
    );

    Ok(())
}

pub fn cmd_recurring_cancel(db: &Database, owner: &str, id: i64) -> Result<()> {
    let def = db.deactivate_recurring(owner, id)?;
    println!(
        "⏹️  Cancelled recurring #{} ({}); existing occurrences are kept",
        def.id, def.description
    );
    Ok(())
}

/// Parse `--through`, refusing dates past today plus the sweep horizon
pub fn bounded_through(through: Option<&str>, config: &LedgerConfig) -> Result<Option<NaiveDate>> {
    let limit = config.materialize_limit(today());
    match parse_date_arg("through", through)? {
        Some(date) if date > limit => Err(anyhow!(
            "--through may not be later than {} (raise sweep.horizon_days to go further)",
            limit
        )),
        other => Ok(other),
    }
}

pub fn cmd_recurring_materialize(
    db: &Database,
    owner: &str,
    id: i64,
    through: Option<&str>,
    config: &LedgerConfig,
) -> Result<()> {
    let def = db.get_recurring(owner, id)?;
    let through = bounded_through(through, config)?.unwrap_or_else(today);

    let result = db.materialize_recurring(&def, through, &config.recurring_suffix)?;

    if result.created.is_empty() {
        println!("Recurring #{} is up to date through {}", id, through);
        return Ok(());
    }

    println!(
        "✅ Created {} occurrence(s) of recurring #{}:",
        result.created.len(),
        id
    );
    for (tx_id, date) in result.created.iter().zip(&result.dates) {
        println!("   #{} on {}", tx_id, date);
    }

    Ok(())
}

pub fn cmd_sweep(db: &Database, through: Option<&str>, config: &LedgerConfig) -> Result<()> {
    let summary = match bounded_through(through, config)? {
        Some(date) => db.sweep_recurring(date, &config.recurring_suffix)?,
        None => fluxo_server::run_sweep(db, config, today())?,
    };

    println!(
        "🔁 Sweep complete: {} definition(s), {} occurrence(s) created",
        summary.definitions, summary.created
    );
    if summary.failed > 0 {
        println!("   ⚠️  {} definition(s) failed, see the log", summary.failed);
    }

    Ok(())
}
