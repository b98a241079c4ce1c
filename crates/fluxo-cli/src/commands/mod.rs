//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `budgets` - Budget commands (list, set, delete)
//! - `core` - Init and shared utilities (open_db, load_config, argument parsing)
//! - `export` - CSV export
//! - `recurring` - Recurring definitions and the sweep
//! - `reminders` - Reminder listing and delivery
//! - `reports` - Period statistics, category rollup, comparison, tips
//! - `serve` - Web server command
//! - `transactions` - Transaction commands (list, add, delete)

pub mod budgets;
pub mod core;
pub mod export;
pub mod recurring;
pub mod reminders;
pub mod reports;
pub mod serve;
pub mod transactions;

// Re-export command functions for main.rs
pub use budgets::*;
pub use core::*;
pub use export::*;
pub use recurring::*;
pub use reminders::*;
pub use reports::*;
pub use serve::*;
pub use transactions::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Amount colored by kind: red for expenses, green for income
pub fn colored_amount(tx_kind: fluxo_core::models::TransactionKind, amount: f64) -> String {
    use fluxo_core::export::format_brl;
    use fluxo_core::models::TransactionKind;

    match tx_kind {
        TransactionKind::Expense => format!("\x1b[31m-{}\x1b[0m", format_brl(amount)),
        TransactionKind::Income => format!("\x1b[32m+{}\x1b[0m", format_brl(amount)),
    }
}
