//! Ledger store with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `transactions` - Transaction CRUD, search, ledger scans
//! - `recurring` - Recurring definitions and occurrence materialization
//! - `budgets` - Category spending limits
//! - `templates` - Reusable transaction shapes
//! - `reports` - Period statistics, category rollups, comparisons
//!
//! Every operation is scoped by owner id. A row owned by someone else is
//! indistinguishable from a missing row.

use chrono::{DateTime, NaiveDate, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::error::Result;

mod budgets;
mod recurring;
mod reports;
mod templates;
mod transaction_filter;
mod transactions;

pub use recurring::{MaterializeResult, SweepSummary};
pub use transaction_filter::{FilterResult, TransactionFilter};

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Parse a SQLite datetime string into a DateTime<Utc>
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    // SQLite stores as "YYYY-MM-DD HH:MM:SS" format
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .or_else(|_| DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc)))
        .unwrap_or_else(|_| Utc::now())
}

/// Parse a stored calendar date
///
/// Accepts `YYYY-MM-DD` and RFC 3339 date-times (taking the UTC calendar date),
/// which older clients submitted.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Open (or create) the ledger at `path` and run migrations
    pub fn new(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
        });
        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing)
    ///
    /// Uses a temporary file rather than `:memory:` so every pooled
    /// connection sees the same data.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "fluxo_test_{}_{}.db",
            std::process::id(),
            id
        ));

        // Remove any existing file
        let _ = std::fs::remove_file(&path);

        Self::new(&path.to_string_lossy())
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL mode: readers don't block writers
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            -- Recurring definitions (never hard-deleted; cancellation clears `active`)
            CREATE TABLE IF NOT EXISTS recurring (
                id INTEGER PRIMARY KEY,
                owner_id TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount >= 0),
                kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
                category TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                frequency TEXT NOT NULL,               -- daily, weekly, monthly, yearly
                weekdays TEXT,                         -- comma-separated: Mon,Wed
                day_of_month INTEGER,
                start_date TEXT NOT NULL,
                end_date TEXT,                         -- inclusive
                materialized_through TEXT,             -- last date already expanded
                active INTEGER NOT NULL DEFAULT 1,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_recurring_owner ON recurring(owner_id, active);

            -- Ledger entries
            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY,
                owner_id TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount >= 0),
                kind TEXT NOT NULL,                    -- income, expense
                date TEXT NOT NULL,                    -- YYYY-MM-DD
                category TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                has_reminder INTEGER NOT NULL DEFAULT 0,
                reminder_sent INTEGER NOT NULL DEFAULT 0,
                recurring_id INTEGER REFERENCES recurring(id),
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_transactions_owner_date ON transactions(owner_id, date);
            CREATE INDEX IF NOT EXISTS idx_transactions_reminders ON transactions(owner_id, has_reminder, reminder_sent);

            -- One materialized entry per (definition, occurrence date)
            CREATE UNIQUE INDEX IF NOT EXISTS idx_transactions_occurrence
                ON transactions(recurring_id, date);

            -- Category spending limits
            CREATE TABLE IF NOT EXISTS budgets (
                id INTEGER PRIMARY KEY,
                owner_id TEXT NOT NULL,
                category TEXT NOT NULL,
                limit_amount REAL NOT NULL CHECK (limit_amount >= 0),
                period TEXT NOT NULL DEFAULT 'month',  -- month, year
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_budgets_owner ON budgets(owner_id, category);

            -- Reusable transaction shapes
            CREATE TABLE IF NOT EXISTS templates (
                id INTEGER PRIMARY KEY,
                owner_id TEXT NOT NULL,
                name TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount >= 0),
                kind TEXT NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_templates_owner ON templates(owner_id);
            "#,
        )?;

        // Ledgers created before the high-water mark existed
        let has_mark: bool = conn.query_row(
            "SELECT COUNT(*) FROM pragma_table_info('recurring') WHERE name = 'materialized_through'",
            [],
            |row| row.get::<_, i64>(0).map(|n| n > 0),
        )?;
        if !has_mark {
            conn.execute_batch("ALTER TABLE recurring ADD COLUMN materialized_through TEXT")?;
        }

        info!(path = %self.db_path, "Database schema initialized");
        Ok(())
    }
}
