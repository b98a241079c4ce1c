//! Reports: period statistics, category rollups, comparisons, reminder views
//!
//! Every report re-reads the owner's ledger (bounded by `fetch_limit`) and
//! runs the pure aggregation over it; nothing is cached. Reminder candidates
//! are narrowed in SQL first.

use chrono::{DateTime, NaiveDate, Utc};

use super::{Database, TransactionFilter};
use crate::aggregate::{aggregate, category_rollup};
use crate::compare::compare;
use crate::config::LedgerConfig;
use crate::error::Result;
use crate::models::{CategoryStats, PeriodComparison, PeriodStats, Transaction};
use crate::reminders::{select_reminders, upcoming};
use crate::window::{current_window, days_after, previous_month_window, Period};

impl Database {
    /// Totals for the current week, month or year
    pub fn period_stats(
        &self,
        owner: &str,
        period: Period,
        now: DateTime<Utc>,
        config: &LedgerConfig,
    ) -> Result<PeriodStats> {
        let ledger = self.load_ledger(owner, config.fetch_limit)?;
        let mut stats = aggregate(&ledger.transactions, &current_window(now, period));
        stats.skipped_records = ledger.skipped;
        Ok(stats)
    }

    /// Current-month expense per category, with budget limits where set
    pub fn category_stats(
        &self,
        owner: &str,
        now: DateTime<Utc>,
        config: &LedgerConfig,
    ) -> Result<Vec<CategoryStats>> {
        let ledger = self.load_ledger(owner, config.fetch_limit)?;
        let budgets = self.list_budgets(owner)?;
        Ok(category_rollup(
            &ledger.transactions,
            &current_window(now, Period::Month),
            &budgets,
        ))
    }

    /// Current month against the previous calendar month
    pub fn month_comparison(
        &self,
        owner: &str,
        now: DateTime<Utc>,
        config: &LedgerConfig,
    ) -> Result<PeriodComparison> {
        let ledger = self.load_ledger(owner, config.fetch_limit)?;

        let mut current = aggregate(&ledger.transactions, &current_window(now, Period::Month));
        let mut previous = aggregate(&ledger.transactions, &previous_month_window(now));
        current.skipped_records = ledger.skipped;
        previous.skipped_records = ledger.skipped;

        Ok(compare(current, previous))
    }

    /// Reminder candidates that are due within the configured lookahead
    pub fn pending_reminders(
        &self,
        owner: &str,
        now: DateTime<Utc>,
        config: &LedgerConfig,
    ) -> Result<Vec<Transaction>> {
        let horizon = days_after(now.date_naive(), config.reminder_lookahead_days);
        let filter = TransactionFilter::new(owner)
            .reminders_pending(true)
            .until(Some(horizon));
        let candidates = self.search_transactions(filter, config.fetch_limit)?;
        Ok(select_reminders(
            &candidates,
            now,
            config.reminder_lookahead_days,
        ))
    }

    /// Entries dated in the next `upcoming_days` days (today excluded)
    pub fn upcoming_transactions(
        &self,
        owner: &str,
        today: NaiveDate,
        config: &LedgerConfig,
    ) -> Result<Vec<Transaction>> {
        let ledger = self.load_ledger(owner, config.fetch_limit)?;
        Ok(upcoming(&ledger.transactions, today, config.upcoming_days))
    }
}
