//! Recurring definitions and occurrence materialization
//!
//! Idempotence rests on the unique `(recurring_id, date)` index: occurrences
//! are inserted with `INSERT OR IGNORE`, so racing sweeps or repeated
//! materialization never produce a second entry for the same date.
//!
//! Each definition also keeps a `materialized_through` high-water mark,
//! advanced in the same SQLite transaction as the inserts. Expansion resumes
//! the day after it, so occurrences the user deleted or moved stay that way.

use std::collections::HashSet;

use chrono::{NaiveDate, Weekday};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::transactions::insert_with_conn;
use super::{parse_date, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{NewRecurring, NewTransaction, RecurrenceRule, RecurringDefinition, Transaction};
use crate::recurrence::{occurrence_transaction, pending_occurrences, with_suffix};

const RECURRING_COLUMNS: &str = "id, owner_id, amount, kind, category, description, frequency, \
     weekdays, day_of_month, start_date, end_date, active, created_at";

/// Outcome of materializing one definition
#[derive(Debug, Clone, Default, Serialize)]
pub struct MaterializeResult {
    pub recurring_id: i64,
    /// Ids of the transactions created by this call
    pub created: Vec<i64>,
    /// Occurrence dates that were created
    pub dates: Vec<NaiveDate>,
}

/// Outcome of a sweep over every active definition
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepSummary {
    pub definitions: usize,
    pub created: usize,
    pub failed: usize,
}

struct RawRecurring {
    id: i64,
    owner_id: String,
    amount: f64,
    kind: String,
    category: String,
    description: String,
    frequency: String,
    weekdays: Option<String>,
    day_of_month: Option<u32>,
    start_date: String,
    end_date: Option<String>,
    active: bool,
    created_at: Option<String>,
}

impl RawRecurring {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            amount: row.get(2)?,
            kind: row.get(3)?,
            category: row.get(4)?,
            description: row.get(5)?,
            frequency: row.get(6)?,
            weekdays: row.get(7)?,
            day_of_month: row.get(8)?,
            start_date: row.get(9)?,
            end_date: row.get(10)?,
            active: row.get(11)?,
            created_at: row.get(12)?,
        })
    }

    fn parse(self) -> Result<RecurringDefinition> {
        let malformed = |field: &str, value: &str| {
            Error::InvalidInput(format!(
                "Recurring definition {} has malformed {} '{}'",
                self.id, field, value
            ))
        };

        let start_date =
            parse_date(&self.start_date).ok_or_else(|| malformed("start_date", &self.start_date))?;
        let end_date = match self.end_date.as_deref() {
            Some(s) if !s.trim().is_empty() => {
                Some(parse_date(s).ok_or_else(|| malformed("end_date", s))?)
            }
            _ => None,
        };
        let weekdays = match self.weekdays.as_deref() {
            Some(s) if !s.trim().is_empty() => Some(decode_weekdays(s)?),
            _ => None,
        };

        Ok(RecurringDefinition {
            id: self.id,
            owner_id: self.owner_id,
            amount: self.amount,
            kind: self.kind.parse()?,
            category: self.category,
            description: self.description,
            frequency: self.frequency.parse()?,
            weekdays,
            day_of_month: self.day_of_month,
            start_date,
            end_date,
            active: self.active,
            created_at: parse_datetime(self.created_at.as_deref().unwrap_or_default()),
        })
    }
}

fn encode_weekdays(days: &[Weekday]) -> String {
    days.iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn decode_weekdays(s: &str) -> Result<Vec<Weekday>> {
    s.split(',')
        .map(|part| {
            part.trim()
                .parse::<Weekday>()
                .map_err(|_| Error::InvalidInput(format!("Unknown weekday: {}", part.trim())))
        })
        .collect()
}

fn parse_all(rows: Vec<RawRecurring>) -> Vec<RecurringDefinition> {
    rows.into_iter()
        .filter_map(|raw| {
            let id = raw.id;
            match raw.parse() {
                Ok(def) => Some(def),
                Err(e) => {
                    warn!(recurring_id = id, error = %e, "Skipping unreadable recurring definition");
                    None
                }
            }
        })
        .collect()
}

fn insert_definition(conn: &Connection, owner: &str, def: &NewRecurring) -> Result<i64> {
    conn.execute(
        r#"
        INSERT INTO recurring (owner_id, amount, kind, category, description, frequency, weekdays, day_of_month, start_date, end_date)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            owner,
            def.amount,
            def.kind.as_str(),
            def.category,
            def.description,
            def.frequency.as_str(),
            def.weekdays.as_deref().map(encode_weekdays),
            def.day_of_month,
            def.start_date.to_string(),
            def.end_date.map(|d| d.to_string()),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Insert an occurrence unless one already exists for `(recurring_id, date)`
fn insert_occurrence_with_conn(
    conn: &Connection,
    owner: &str,
    recurring_id: i64,
    tx: &NewTransaction,
) -> Result<Option<i64>> {
    let inserted = conn.execute(
        r#"
        INSERT OR IGNORE INTO transactions (owner_id, amount, kind, date, category, description, has_reminder, recurring_id)
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

    if inserted == 0 {
        Ok(None)
    } else {
        Ok(Some(conn.last_insert_rowid()))
    }
}

fn materialized_dates_with_conn(conn: &Connection, recurring_id: i64) -> Result<HashSet<NaiveDate>> {
    let mut stmt = conn.prepare("SELECT date FROM transactions WHERE recurring_id = ?")?;
    let dates = stmt
        .query_map(params![recurring_id], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?
        .into_iter()
        .filter_map(|s| parse_date(&s))
        .collect();
    Ok(dates)
}

/// Last date already expanded for a definition; None for definitions that
/// predate the mark
fn materialized_through(conn: &Connection, recurring_id: i64) -> Result<Option<NaiveDate>> {
    let mark: Option<String> = conn
        .query_row(
            "SELECT materialized_through FROM recurring WHERE id = ?",
            params![recurring_id],
            |row| row.get(0),
        )
        .optional()?
        .flatten();
    Ok(mark.as_deref().and_then(parse_date))
}

/// Move the high-water mark forward; never backwards
fn advance_mark(conn: &Connection, recurring_id: i64, through: NaiveDate) -> Result<()> {
    conn.execute(
        r#"
        UPDATE recurring SET materialized_through = ?1
        WHERE id = ?2 AND (materialized_through IS NULL OR materialized_through < ?1)
        "#,
        params![through.to_string(), recurring_id],
    )?;
    Ok(())
}

impl Database {
    /// Store a definition without materializing anything
    pub fn insert_recurring(&self, owner: &str, def: NewRecurring) -> Result<i64> {
        let def = def.normalized();
        def.validate()?;
        let conn = self.conn()?;
        insert_definition(&conn, owner, &def)
    }

    pub fn get_recurring(&self, owner: &str, id: i64) -> Result<RecurringDefinition> {
        let conn = self.conn()?;
        let raw = conn
            .query_row(
                &format!(
                    "SELECT {} FROM recurring WHERE id = ? AND owner_id = ?",
                    RECURRING_COLUMNS
                ),
                params![id, owner],
                RawRecurring::from_row,
            )
            .optional()?;

        match raw {
            Some(raw) => raw.parse(),
            None => Err(Error::not_found("Recurring definition", id)),
        }
    }

    /// All of the owner's definitions, active first, newest first
    pub fn list_recurring(&self, owner: &str) -> Result<Vec<RecurringDefinition>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM recurring WHERE owner_id = ? ORDER BY active DESC, id DESC",
            RECURRING_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![owner], RawRecurring::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(parse_all(rows))
    }

    /// Active definitions across every owner (for the background sweep)
    pub fn list_active_recurring_all(&self) -> Result<Vec<RecurringDefinition>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM recurring WHERE active = 1 ORDER BY id",
            RECURRING_COLUMNS
        ))?;
        let rows = stmt
            .query_map([], RawRecurring::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(parse_all(rows))
    }

    /// Cancel a definition. One-way: there is no reactivation.
    /// Occurrences already materialized are kept.
    pub fn deactivate_recurring(&self, owner: &str, id: i64) -> Result<RecurringDefinition> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE recurring SET active = 0 WHERE id = ? AND owner_id = ?",
            params![id, owner],
        )?;
        if changed == 0 {
            return Err(Error::not_found("Recurring definition", id));
        }
        drop(conn);

        info!(recurring_id = id, owner = %owner, "Recurring definition cancelled");
        self.get_recurring(owner, id)
    }

    /// Dates that already have a materialized occurrence
    pub fn materialized_dates(&self, recurring_id: i64) -> Result<HashSet<NaiveDate>> {
        let conn = self.conn()?;
        materialized_dates_with_conn(&conn, recurring_id)
    }

    /// Create a definition from a submitted transaction and materialize its
    /// first occurrence (on the transaction's date) in the same SQLite transaction
    pub fn create_recurring(
        &self,
        owner: &str,
        tx: &NewTransaction,
        rule: &RecurrenceRule,
        suffix: &str,
    ) -> Result<(RecurringDefinition, Transaction)> {
        tx.validate()?;
        let def = NewRecurring::from_transaction(tx, rule).normalized();
        def.validate()?;

        let first = NewTransaction {
            description: with_suffix(&tx.description, suffix),
            ..tx.clone()
        };

        let mut conn = self.conn()?;
        let db_tx = conn.transaction()?;
        let recurring_id = insert_definition(&db_tx, owner, &def)?;
        let transaction_id = insert_with_conn(&db_tx, owner, &first, Some(recurring_id))?;
        advance_mark(&db_tx, recurring_id, first.date)?;
        db_tx.commit()?;
        drop(conn);

        info!(
            recurring_id,
            transaction_id,
            owner = %owner,
            frequency = %def.frequency,
            "Recurring definition created"
        );

        Ok((
            self.get_recurring(owner, recurring_id)?,
            self.get_transaction(owner, transaction_id)?,
        ))
    }

    /// Materialize every missing occurrence of `def` from its start date through `through`
    pub fn materialize_recurring(
        &self,
        def: &RecurringDefinition,
        through: NaiveDate,
        suffix: &str,
    ) -> Result<MaterializeResult> {
        let mut result = MaterializeResult {
            recurring_id: def.id,
            ..Default::default()
        };
        if !def.active {
            debug!(recurring_id = def.id, "Skipping inactive definition");
            return Ok(result);
        }

        let mut conn = self.conn()?;
        let db_tx = conn.transaction()?;

        let from = match materialized_through(&db_tx, def.id)? {
            Some(mark) => match mark.succ_opt() {
                Some(next) => next.max(def.start_date),
                None => return Ok(result),
            },
            None => def.start_date,
        };
        if from > through {
            return Ok(result);
        }

        let existing = materialized_dates_with_conn(&db_tx, def.id)?;
        let pending = pending_occurrences(def, from, through, &existing);
        for date in pending {
            let tx = occurrence_transaction(def, date, suffix);
            if let Some(id) = insert_occurrence_with_conn(&db_tx, &def.owner_id, def.id, &tx)? {
                result.created.push(id);
                result.dates.push(date);
            }
        }
        advance_mark(&db_tx, def.id, through)?;
        db_tx.commit()?;

        if !result.created.is_empty() {
            info!(
                recurring_id = def.id,
                created = result.created.len(),
                through = %through,
                "Materialized recurring occurrences"
            );
        }
        Ok(result)
    }

    /// Materialize all active definitions (every owner) through `through`.
    /// A failing definition is logged and does not stop the sweep.
    pub fn sweep_recurring(&self, through: NaiveDate, suffix: &str) -> Result<SweepSummary> {
        let definitions = self.list_active_recurring_all()?;
        let mut summary = SweepSummary {
            definitions: definitions.len(),
            ..Default::default()
        };

        for def in &definitions {
            match self.materialize_recurring(def, through, suffix) {
                Ok(result) => summary.created += result.created.len(),
                Err(e) => {
                    warn!(recurring_id = def.id, error = %e, "Failed to materialize definition");
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }
}

