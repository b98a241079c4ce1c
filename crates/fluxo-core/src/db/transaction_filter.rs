//! Transaction filter builder for constructing dynamic SQL queries
//!
//! Shared by listing, search and export so the WHERE clause is built in one
//! place. The owner condition is always present.

use chrono::NaiveDate;

use crate::models::TransactionKind;

/// Builder for constructing transaction query filters
///
/// The lifetime `'query` represents how long borrowed parameters (owner id,
/// category, search term) must remain valid.
#[derive(Default)]
pub struct TransactionFilter<'query> {
    pub owner_id: &'query str,
    pub category: Option<&'query str>,
    pub kind: Option<TransactionKind>,
    pub search: Option<&'query str>,
    /// Inclusive lower bound
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound
    pub to: Option<NaiveDate>,
    pub reminders_pending: bool,
    pub sort_field: Option<&'query str>,
    pub sort_order: Option<&'query str>,
}

/// Result of building a filter - contains SQL components and parameters
pub struct FilterResult {
    /// WHERE clause including "WHERE" keyword
    pub where_clause: String,
    /// ORDER BY clause including "ORDER BY" keyword
    pub order_clause: String,
    /// Parameters for the query (boxed for rusqlite compatibility)
    pub params: Vec<Box<dyn rusqlite::ToSql>>,
}

impl<'query> TransactionFilter<'query> {
    pub fn new(owner_id: &'query str) -> Self {
        Self {
            owner_id,
            ..Self::default()
        }
    }

    /// Exact, case-sensitive category match
    pub fn category(mut self, category: Option<&'query str>) -> Self {
        self.category = category;
        self
    }

    pub fn kind(mut self, kind: Option<TransactionKind>) -> Self {
        self.kind = kind;
        self
    }

    /// Set search query (searches description and category)
    pub fn search(mut self, query: Option<&'query str>) -> Self {
        self.search = query;
        self
    }

    pub fn since(mut self, date: Option<NaiveDate>) -> Self {
        self.from = date;
        self
    }

    pub fn until(mut self, date: Option<NaiveDate>) -> Self {
        self.to = date;
        self
    }

    /// Only entries flagged for a reminder that has not been sent
    pub fn reminders_pending(mut self, value: bool) -> Self {
        self.reminders_pending = value;
        self
    }

    /// Set sort field (date or amount)
    pub fn sort_field(mut self, field: Option<&'query str>) -> Self {
        self.sort_field = field;
        self
    }

    /// Set sort order (asc or desc)
    pub fn sort_order(mut self, order: Option<&'query str>) -> Self {
        self.sort_order = order;
        self
    }

    /// Build the filter components
    pub fn build(self) -> FilterResult {
        let mut conditions = vec!["t.owner_id = ?".to_string()];
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(self.owner_id.to_string())];

        if let Some(category) = self.category {
            if !category.is_empty() {
                conditions.push("t.category = ?".to_string());
                params.push(Box::new(category.to_string()));
            }
        }

        if let Some(kind) = self.kind {
            conditions.push("t.kind = ?".to_string());
            params.push(Box::new(kind.as_str()));
        }

        if let Some(q) = self.search {
            if !q.trim().is_empty() {
                conditions.push(
                    "(t.description LIKE ? COLLATE NOCASE OR t.category LIKE ? COLLATE NOCASE)"
                        .to_string(),
                );
                let pattern = format!("%{}%", q.trim());
                params.push(Box::new(pattern.clone()));
                params.push(Box::new(pattern));
            }
        }

        // Compare on the calendar-date prefix so legacy date-time strings still match
        if let Some(from) = self.from {
            conditions.push("substr(t.date, 1, 10) >= ?".to_string());
            params.push(Box::new(from.to_string()));
        }
        if let Some(to) = self.to {
            conditions.push("substr(t.date, 1, 10) <= ?".to_string());
            params.push(Box::new(to.to_string()));
        }

        if self.reminders_pending {
            conditions.push("t.has_reminder = 1 AND t.reminder_sent = 0".to_string());
        }

        let where_clause = format!("WHERE {}", conditions.join(" AND "));

        let order_column = match self.sort_field {
            Some("amount") => "t.amount",
            _ => "t.date",
        };
        let order_dir = match self.sort_order {
            Some("asc") => "ASC",
            _ => "DESC",
        };
        let order_clause = format!("ORDER BY {} {}, t.id DESC", order_column, order_dir);

        FilterResult {
            where_clause,
            order_clause,
            params,
        }
    }
}

impl FilterResult {
    /// Build a COUNT query
    pub fn build_count_query(&self) -> String {
        format!("SELECT COUNT(*) FROM transactions t {}", self.where_clause)
    }

    /// Get parameter references for query execution
    pub fn params_refs(&self) -> Vec<&dyn rusqlite::ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_only() {
        let result = TransactionFilter::new("alice").build();
        assert_eq!(result.where_clause, "WHERE t.owner_id = ?");
        assert_eq!(result.params.len(), 1);
        assert_eq!(result.order_clause, "ORDER BY t.date DESC, t.id DESC");
    }

    #[test]
    fn test_all_conditions() {
        let result = TransactionFilter::new("alice")
            .category(Some("Food"))
            .kind(Some(TransactionKind::Expense))
            .search(Some("  mercado "))
            .since(NaiveDate::from_ymd_opt(2024, 3, 1))
            .until(NaiveDate::from_ymd_opt(2024, 3, 31))
            .reminders_pending(true)
            .build();

        assert!(result.where_clause.contains("t.category = ?"));
        assert!(result.where_clause.contains("t.kind = ?"));
        assert!(result.where_clause.contains("LIKE ? COLLATE NOCASE"));
        assert!(result.where_clause.contains("substr(t.date, 1, 10) >= ?"));
        assert!(result.where_clause.contains("t.reminder_sent = 0"));
        // owner + category + kind + 2 search + from + to
        assert_eq!(result.params.len(), 7);
    }

    #[test]
    fn test_blank_search_ignored() {
        let result = TransactionFilter::new("alice").search(Some("   ")).build();
        assert_eq!(result.params.len(), 1);
    }

    #[test]
    fn test_sort_by_amount_asc() {
        let result = TransactionFilter::new("alice")
            .sort_field(Some("amount"))
            .sort_order(Some("asc"))
            .build();
        assert_eq!(result.order_clause, "ORDER BY t.amount ASC, t.id DESC");
        assert!(result.build_count_query().starts_with("SELECT COUNT(*)"));
    }
}
