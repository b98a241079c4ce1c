//! Transaction operations

use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::{debug, warn};

use super::transaction_filter::TransactionFilter;
use super::{parse_date, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Ledger, NewTransaction, Transaction, TransactionKind, TransactionUpdate};

pub(crate) const TX_COLUMNS: &str = "t.id, t.owner_id, t.amount, t.kind, t.date, t.category, \
     t.description, t.has_reminder, t.reminder_sent, t.recurring_id, t.created_at";

/// A transaction row before its date and kind are parsed
pub(crate) struct RawTransaction {
    id: i64,
    owner_id: String,
    amount: f64,
    kind: String,
    date: String,
    category: String,
    description: String,
    has_reminder: bool,
    reminder_sent: bool,
    recurring_id: Option<i64>,
    created_at: String,
}

impl RawTransaction {
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            amount: row.get(2)?,
            kind: row.get(3)?,
            date: row.get(4)?,
            category: row.get(5)?,
            description: row.get(6)?,
            has_reminder: row.get(7)?,
            reminder_sent: row.get(8)?,
            recurring_id: row.get(9)?,
            created_at: row.get::<_, Option<String>>(10)?.unwrap_or_default(),
        })
    }

    pub(crate) fn parse(self) -> Result<Transaction> {
        let date = parse_date(&self.date).ok_or_else(|| {
            Error::InvalidInput(format!(
                "Transaction {} has malformed date '{}'",
                self.id, self.date
            ))
        })?;
        let kind: TransactionKind = self.kind.parse()?;

        Ok(Transaction {
            id: self.id,
            owner_id: self.owner_id,
            amount: self.amount,
            kind,
            date,
            category: self.category,
            description: self.description,
            has_reminder: self.has_reminder,
            reminder_sent: self.reminder_sent,
            recurring_id: self.recurring_id,
            created_at: parse_datetime(&self.created_at),
        })
    }
}

/// Parse every raw row, skipping (and counting) the ones that cannot be read
fn parse_rows(rows: Vec<RawTransaction>) -> Ledger {
    let mut ledger = Ledger::default();
    for raw in rows {
        let id = raw.id;
        match raw.parse() {
            Ok(tx) => ledger.transactions.push(tx),
            Err(e) => {
                warn!(transaction_id = id, error = %e, "Skipping unreadable ledger record");
                ledger.skipped += 1;
            }
        }
    }
    ledger
}

impl Database {
    /// Insert a transaction for `owner`
    pub fn insert_transaction(&self, owner: &str, tx: &NewTransaction) -> Result<i64> {
        tx.validate()?;
        let conn = self.conn()?;
        insert_with_conn(&conn, owner, tx, None)
    }

    /// Fetch one transaction
    pub fn get_transaction(&self, owner: &str, id: i64) -> Result<Transaction> {
        let conn = self.conn()?;
        let raw = conn
            .query_row(
                &format!(
                    "SELECT {} FROM transactions t WHERE t.id = ? AND t.owner_id = ?",
                    TX_COLUMNS
                ),
                params![id, owner],
                RawTransaction::from_row,
            )
            .optional()?;

        match raw {
            Some(raw) => raw.parse(),
            None => Err(Error::not_found("Transaction", id)),
        }
    }

    /// Most recent transactions first, at most `limit`
    pub fn list_transactions(&self, owner: &str, limit: i64) -> Result<Vec<Transaction>> {
        self.search_transactions(TransactionFilter::new(owner), limit)
    }

    /// Search with filters; unreadable rows are left out
    pub fn search_transactions(
        &self,
        filter: TransactionFilter<'_>,
        limit: i64,
    ) -> Result<Vec<Transaction>> {
        Ok(self.scan(filter, limit)?.transactions)
    }

    /// Count transactions matching a filter
    pub fn count_transactions(&self, filter: TransactionFilter<'_>) -> Result<i64> {
        let conn = self.conn()?;
        let result = filter.build();
        let count = conn.query_row(
            &result.build_count_query(),
            params_from_iter(result.params_refs()),
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Everything the owner has (up to `limit` rows) in a single scan
    ///
    /// Rows with an unparseable date are skipped and counted rather than
    /// failing the whole read.
    pub fn load_ledger(&self, owner: &str, limit: i64) -> Result<Ledger> {
        self.scan(TransactionFilter::new(owner), limit)
    }

    fn scan(&self, filter: TransactionFilter<'_>, limit: i64) -> Result<Ledger> {
        let conn = self.conn()?;
        let result = filter.build();
        let sql = format!(
            "SELECT {} FROM transactions t {} {} LIMIT {}",
            TX_COLUMNS,
            result.where_clause,
            result.order_clause,
            limit.max(0)
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(result.params_refs()), RawTransaction::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let ledger = parse_rows(rows);
        debug!(
            rows = ledger.transactions.len(),
            skipped = ledger.skipped,
            "Ledger scan complete"
        );
        Ok(ledger)
    }

    /// Apply a partial update; untouched fields keep their values
    pub fn update_transaction(
        &self,
        owner: &str,
        id: i64,
        update: &TransactionUpdate,
    ) -> Result<Transaction> {
        update.validate()?;
        if update.is_empty() {
            return self.get_transaction(owner, id);
        }

        let mut sets = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(amount) = update.amount {
            sets.push("amount = ?");
            values.push(Box::new(amount));
        }
        if let Some(kind) = update.kind {
            sets.push("kind = ?");
            values.push(Box::new(kind.as_str()));
        }
        if let Some(date) = update.date {
            sets.push("date = ?");
            values.push(Box::new(date.to_string()));
        }
        if let Some(ref category) = update.category {
            if category.trim().is_empty() {
                return Err(Error::InvalidInput("Category must not be empty".into()));
            }
            sets.push("category = ?");
            values.push(Box::new(category.clone()));
        }
        if let Some(ref description) = update.description {
            sets.push("description = ?");
            values.push(Box::new(description.clone()));
        }
        if let Some(has_reminder) = update.has_reminder {
            sets.push("has_reminder = ?");
            values.push(Box::new(has_reminder));
        }

        values.push(Box::new(id));
        values.push(Box::new(owner.to_string()));

        let conn = self.conn()?;
        let changed = conn
            .execute(
                &format!(
                    "UPDATE transactions SET {} WHERE id = ? AND owner_id = ?",
                    sets.join(", ")
                ),
                params_from_iter(values.iter().map(|v| v.as_ref())),
            )
            .map_err(|e| match e {
                // Only the (recurring_id, date) index can reject an update
                rusqlite::Error::SqliteFailure(ref err, _)
                    if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    Error::InvalidInput(format!(
                        "Another occurrence of this recurring transaction already falls on {}",
                        update
                            .date
                            .map(|d| d.to_string())
                            .unwrap_or_else(|| "that date".into())
                    ))
                }
                other => Error::Database(other),
            })?;

        if changed == 0 {
            return Err(Error::not_found("Transaction", id));
        }
        drop(conn);
        self.get_transaction(owner, id)
    }

    /// Delete one transaction, returning the number of rows removed (0 or 1)
    pub fn delete_transaction(&self, owner: &str, id: i64) -> Result<usize> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM transactions WHERE id = ? AND owner_id = ?",
            params![id, owner],
        )?;
        Ok(removed)
    }

    /// Bulk delete; ids owned by someone else are ignored
    pub fn delete_transactions(&self, owner: &str, ids: &[i64]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let conn = self.conn()?;
        let removed = conn.execute(
            &format!(
                "DELETE FROM transactions WHERE owner_id = ? AND id IN ({})",
                placeholders(ids.len())
            ),
            params_from_iter(id_params(owner, ids).iter().map(|v| v.as_ref())),
        )?;
        Ok(removed)
    }

    /// Flag reminders as delivered
    pub fn mark_reminders_sent(&self, owner: &str, ids: &[i64]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let conn = self.conn()?;
        let updated = conn.execute(
            &format!(
                "UPDATE transactions SET reminder_sent = 1 WHERE owner_id = ? AND id IN ({})",
                placeholders(ids.len())
            ),
            params_from_iter(id_params(owner, ids).iter().map(|v| v.as_ref())),
        )?;
        Ok(updated)
    }

    /// Distinct category labels used by the owner, alphabetically
    pub fn list_categories(&self, owner: &str) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT category FROM transactions WHERE owner_id = ? ORDER BY category",
        )?;
        let categories = stmt
            .query_map(params![owner], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(categories)
    }
}

/// Insert on an existing connection; `recurring_id` tags materialized occurrences
pub(crate) fn insert_with_conn(
    conn: &Connection,
    owner: &str,
    tx: &NewTransaction,
    recurring_id: Option<i64>,
) -> Result<i64> {
    conn.execute(
        r#"
        INSERT INTO transactions (owner_id, amount, kind, date, category, description, has_reminder, recurring_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            owner,
            tx.amount,
            tx.kind.as_str(),
            tx.date.to_string(),
            tx.category,
            tx.description,
            tx.has_reminder,
            recurring_id,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

fn id_params(owner: &str, ids: &[i64]) -> Vec<Box<dyn rusqlite::ToSql>> {
    let mut values: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(owner.to_string())];
    values.extend(ids.iter().map(|id| Box::new(*id) as Box<dyn rusqlite::ToSql>));
    values
}
