//! Transaction command implementations

use anyhow::{bail, Result};
use fluxo_core::db::{Database, TransactionFilter};
use fluxo_core::models::{NewTransaction, TransactionKind};

use super::{colored_amount, parse_date_arg, today, truncate};

/// Filters for `transactions list`
#[derive(Debug)]
pub struct ListOptions {
    pub limit: i64,
    pub category: Option<String>,
    pub kind: Option<String>,
    pub search: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            limit: 20,
            category: None,
            kind: None,
            search: None,
            from: None,
            to: None,
        }
    }
}

/// Fields for `transactions add`
#[derive(Debug)]
pub struct AddOptions {
    pub amount: f64,
    pub kind: String,
    pub category: String,
    pub description: String,
    pub date: Option<String>,
    pub reminder: bool,
}

pub fn cmd_transactions_list(db: &Database, owner: &str, opts: &ListOptions) -> Result<()> {
    let kind = opts
        .kind
        .as_deref()
        .map(str::parse::<TransactionKind>)
        .transpose()?;
    let from = parse_date_arg("from", opts.from.as_deref())?;
    let to = parse_date_arg("to", opts.to.as_deref())?;

    let filter = || {
        TransactionFilter::new(owner)
            .category(opts.category.as_deref())
            .kind(kind)
            .search(opts.search.as_deref())
            .since(from)
            .until(to)
    };

    let transactions = db.search_transactions(filter(), opts.limit.max(1))?;

    if transactions.is_empty() {
        println!("No transactions found. Record one with:");
        println!("  fluxo transactions add 42.50 -c Food -d \"Lunch\"");
        return Ok(());
    }

    let total = db.count_transactions(filter())?;

    println!();
    println!(
        "📝 Transactions ({} of {})",
        transactions.len(),
        total
    );
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        let marker = if tx.recurring_id.is_some() { "↻" } else { " " };
        println!(
            "   #{:<5} {} │ {:>22} │ {:<14} │ {} {}",
            tx.id,
            tx.date,
            colored_amount(tx.kind, tx.amount),
            truncate(&tx.category, 14),
            marker,
            truncate(&tx.description, 36)
        );
    }

    Ok(())
}

pub fn cmd_transactions_add(db: &Database, owner: &str, opts: &AddOptions) -> Result<()> {
    let tx = NewTransaction {
        amount: opts.amount,
        kind: opts.kind.parse()?,
        date: parse_date_arg("date", opts.date.as_deref())?.unwrap_or_else(today),
        category: opts.category.trim().to_string(),
        description: opts.description.trim().to_string(),
        has_reminder: opts.reminder,
    };

    let id = db.insert_transaction(owner, &tx)?;

    println!(
        "✅ Recorded {} #{}: {} on {} ({})",
        tx.kind.label(),
        id,
        colored_amount(tx.kind, tx.amount),
        tx.date,
        tx.category
    );
    if tx.has_reminder {
        println!("   🔔 Reminder enabled");
    }

    Ok(())
}

pub fn cmd_transactions_delete(db: &Database, owner: &str, id: i64) -> Result<()> {
    if db.delete_transaction(owner, id)? == 0 {
        bail!("Transaction {} not found", id);
    }
    println!("🗑️  Deleted transaction #{}", id);
    Ok(())
}
