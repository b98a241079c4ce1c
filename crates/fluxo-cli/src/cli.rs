//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Fluxo - Personal cash-flow ledger
#[derive(Parser)]
#[command(name = "fluxo")]
#[command(about = "Personal cash-flow ledger with recurring entries and reminders", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "fluxo.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Owner id the command acts on
    #[arg(long, default_value = "local", global = true)]
    pub owner: String,

    /// Config file (defaults to FLUXO_CONFIG or the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Accept requests without an owner header (acts as the local owner)
        #[arg(long)]
        no_auth: bool,
    },

    /// Manage transactions (list, add, delete)
    Transactions {
        #[command(subcommand)]
        action: Option<TransactionsAction>,
    },

    /// Income, expense and balance for the current week, month or year
    Stats {
        /// Period: week, month, year
        #[arg(default_value = "month")]
        period: String,
    },

    /// Current-month expense per category, with budget limits
    Categories,

    /// Current month against the previous month
    Compare,

    /// Manage recurring transactions
    Recurring {
        #[command(subcommand)]
        action: Option<RecurringAction>,
    },

    /// Manage category budgets
    Budgets {
        #[command(subcommand)]
        action: Option<BudgetsAction>,
    },

    /// List or send due reminders
    Reminders {
        #[command(subcommand)]
        action: Option<RemindersAction>,
    },

    /// Financial tips for a period
    Tips {
        /// Period: week, month, year
        #[arg(default_value = "month")]
        period: String,
    },

    /// Export transactions to CSV
    Export {
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// Materialize due recurring occurrences for every owner
    Sweep {
        /// Materialize through this date (default: today plus the configured horizon)
        #[arg(long)]
        through: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// List recent transactions
    List {
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: i64,

        /// Only this category
        #[arg(long)]
        category: Option<String>,

        /// Only this kind: income, expense
        #[arg(long)]
        kind: Option<String>,

        /// Search description and category
        #[arg(short, long)]
        search: Option<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// Record a transaction
    Add {
        /// Amount (non-negative)
        amount: f64,

        /// Kind: income, expense
        #[arg(short, long, default_value = "expense")]
        kind: String,

        /// Category label
        #[arg(short, long)]
        category: String,

        /// Description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Date (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,

        /// Send a reminder before the date
        #[arg(long)]
        reminder: bool,
    },

    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum RecurringAction {
    /// List recurring definitions
    List,

    /// Create a recurring definition and its first occurrence
    Add {
        /// Amount (non-negative)
        amount: f64,

        /// Frequency: daily, weekly, monthly, yearly
        #[arg(short, long)]
        frequency: String,

        /// Kind: income, expense
        #[arg(short, long, default_value = "expense")]
        kind: String,

        /// Category label
        #[arg(short, long)]
        category: String,

        /// Description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Start date (YYYY-MM-DD, default today)
        #[arg(long)]
        start: Option<String>,

        /// Weekdays for weekly definitions (comma-separated, e.g. mon,thu)
        #[arg(long)]
        weekdays: Option<String>,

        /// Day of month for monthly and yearly definitions
        #[arg(long)]
        day: Option<u32>,

        /// Last date an occurrence may fall on (YYYY-MM-DD)
        #[arg(long)]
        until: Option<String>,
    },

    /// Stop a definition from producing further occurrences
    Cancel {
        /// Recurring definition ID
        id: i64,
    },

    /// Materialize missing occurrences of one definition
    Materialize {
        /// Recurring definition ID
        id: i64,

        /// Materialize through this date (default: today)
        #[arg(long)]
        through: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum BudgetsAction {
    /// List budgets
    List,

    /// Set a spending limit for a category
    Set {
        /// Category label
        category: String,

        /// Spending limit
        limit: f64,

        /// Budget period: month, year
        #[arg(short, long, default_value = "month")]
        period: String,
    },

    /// Delete a budget
    Delete {
        /// Budget ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum RemindersAction {
    /// List transactions due for a reminder
    List,

    /// Email the due reminders and mark them sent
    Send {
        /// Recipient email address
        #[arg(long)]
        to: String,
    },
}
