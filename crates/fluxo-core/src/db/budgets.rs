//! Budget operations

use rusqlite::types::Type;
use rusqlite::{params, Row};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{validate_amount, Budget, NewBudget};

fn budget_from_row(row: &Row) -> rusqlite::Result<Budget> {
    let period: String = row.get(4)?;
    let created_at: Option<String> = row.get(5)?;
    Ok(Budget {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        category: row.get(2)?,
        limit: row.get(3)?,
        period: period
            .parse()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?,
        created_at: parse_datetime(created_at.as_deref().unwrap_or_default()),
    })
}

impl Database {
    /// Create a budget. Duplicates for the same category are allowed; lookups
    /// use the most recently created one.
    pub fn upsert_budget(&self, owner: &str, budget: &NewBudget) -> Result<Budget> {
        validate_amount(budget.limit)?;
        if budget.category.trim().is_empty() {
            return Err(Error::InvalidInput("Category must not be empty".into()));
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO budgets (owner_id, category, limit_amount, period) VALUES (?, ?, ?, ?)",
            params![owner, budget.category, budget.limit, budget.period.as_str()],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_budget(owner, id)
    }

    pub fn get_budget(&self, owner: &str, id: i64) -> Result<Budget> {
        self.list_budgets(owner)?
            .into_iter()
            .find(|b| b.id == id)
            .ok_or_else(|| Error::not_found("Budget", id))
    }

    /// Change a budget's limit
    pub fn update_budget_limit(&self, owner: &str, id: i64, limit: f64) -> Result<Budget> {
        validate_amount(limit)?;
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE budgets SET limit_amount = ? WHERE id = ? AND owner_id = ?",
            params![limit, id, owner],
        )?;
        if changed == 0 {
            return Err(Error::not_found("Budget", id));
        }
        drop(conn);
        self.get_budget(owner, id)
    }

    /// The owner's budgets in creation order
    pub fn list_budgets(&self, owner: &str) -> Result<Vec<Budget>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, owner_id, category, limit_amount, period, created_at
             FROM budgets WHERE owner_id = ? ORDER BY id",
        )?;
        let budgets = stmt
            .query_map(params![owner], budget_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(budgets)
    }

    /// Delete a budget, returning the number of rows removed
    pub fn delete_budget(&self, owner: &str, id: i64) -> Result<usize> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM budgets WHERE id = ? AND owner_id = ?",
            params![id, owner],
        )?;
        Ok(removed)
    }
}
