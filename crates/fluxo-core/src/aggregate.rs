//! Period totals and category rollups
//!
//! Pure functions over a caller-supplied transaction list. Totals are
//! order-independent; the returned transaction list is sorted for display
//! (newest date first).

use std::collections::{HashMap, HashSet};

use crate::models::{Budget, BudgetPeriod, CategoryStats, PeriodStats, Transaction, TransactionKind};
use crate::window::Window;

/// Transactions whose date falls inside `window`, each id at most once
pub fn select<'a>(transactions: &'a [Transaction], window: &Window) -> Vec<&'a Transaction> {
    let mut seen = HashSet::new();
    transactions
        .iter()
        .filter(|t| window.contains_date(t.date))
        .filter(|t| seen.insert(t.id))
        .collect()
}

/// Income/expense totals and balance for a window
pub fn aggregate(transactions: &[Transaction], window: &Window) -> PeriodStats {
    let mut selected: Vec<Transaction> = select(transactions, window).into_iter().cloned().collect();
    selected.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));

    let mut total_income = 0.0;
    let mut total_expense = 0.0;
    for tx in &selected {
        match tx.kind {
            TransactionKind::Income => total_income += tx.amount,
            TransactionKind::Expense => total_expense += tx.amount,
        }
    }

    PeriodStats {
        total_income,
        total_expense,
        balance: total_income - total_expense,
        transactions: selected,
        skipped_records: 0,
    }
}

/// Expense totals per category label (exact, case-sensitive), in first-seen order
pub fn expense_by_category<'a, I>(transactions: I) -> Vec<(String, f64)>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut totals: Vec<(String, f64)> = Vec::new();

    for tx in transactions {
        match tx.kind {
            TransactionKind::Expense => {}
            TransactionKind::Income => continue,
        }
        match index.get(tx.category.as_str()) {
            Some(&i) => totals[i].1 += tx.amount,
            None => {
                index.insert(tx.category.as_str(), totals.len());
                totals.push((tx.category.clone(), tx.amount));
            }
        }
    }

    totals
}

/// Monthly budget limit per category; the most recently created budget wins
pub fn monthly_limits(budgets: &[Budget]) -> HashMap<&str, f64> {
    let mut ordered: Vec<&Budget> = budgets
        .iter()
        .filter(|b| b.period == BudgetPeriod::Month)
        .collect();
    ordered.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

    ordered
        .into_iter()
        .map(|b| (b.category.as_str(), b.limit))
        .collect()
}

/// Per-category expense stats for `window` (normally the current month),
/// sorted by descending total with ties kept in first-seen order
pub fn category_rollup(
    transactions: &[Transaction],
    window: &Window,
    budgets: &[Budget],
) -> Vec<CategoryStats> {
    let totals = expense_by_category(select(transactions, window));
    let grand_total: f64 = totals.iter().map(|(_, amount)| amount).sum();
    let limits = monthly_limits(budgets);

    let mut stats: Vec<CategoryStats> = totals
        .into_iter()
        .map(|(category, total)| {
            let budget_limit = limits.get(category.as_str()).copied();
            CategoryStats {
                percentage: if grand_total > 0.0 {
                    (total / grand_total) * 100.0
                } else {
                    0.0
                },
                remaining: budget_limit.map(|limit| limit - total),
                budget_limit,
                category,
                total,
            }
        })
        .collect();

    stats.sort_by(|a, b| b.total.total_cmp(&a.total));
    stats
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::window::{current_window, midnight, Period};
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    pub(crate) fn tx(
        id: i64,
        amount: f64,
        kind: TransactionKind,
        category: &str,
        date: (i32, u32, u32),
    ) -> Transaction {
        Transaction {
            id,
            owner_id: "alice".into(),
            amount,
            kind,
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            category: category.into(),
            description: format!("tx {}", id),
            has_reminder: false,
            reminder_sent: false,
            recurring_id: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn budget(id: i64, category: &str, limit: f64, period: BudgetPeriod) -> Budget {
        Budget {
            id,
            owner_id: "alice".into(),
            category: category.into(),
            limit,
            period,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, id as u32).unwrap(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_month_scenario() {
        let ledger = vec![
            tx(1, 5000.0, TransactionKind::Income, "Salary", (2024, 3, 1)),
            tx(2, 150.0, TransactionKind::Expense, "Food", (2024, 3, 5)),
        ];
        let window = current_window(now(), Period::Month);

        let stats = aggregate(&ledger, &window);
        assert_eq!(stats.total_income, 5000.0);
        assert_eq!(stats.total_expense, 150.0);
        assert_eq!(stats.balance, 4850.0);

        let categories = category_rollup(&ledger, &window, &[]);
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].category, "Food");
        assert_eq!(categories[0].total, 150.0);
        assert_eq!(categories[0].percentage, 100.0);
        assert!(categories[0].budget_limit.is_none());
        assert!(categories[0].remaining.is_none());
    }

    #[test]
    fn test_balance_identity_holds() {
        let ledger: Vec<Transaction> = (0..40)
            .map(|i| {
                let kind = if i % 3 == 0 {
                    TransactionKind::Income
                } else {
                    TransactionKind::Expense
                };
                tx(i, 10.25 * i as f64, kind, "Misc", (2024, 1 + (i % 3) as u32, 1 + (i % 27) as u32))
            })
            .collect();

        for period in [Period::Week, Period::Month, Period::Year] {
            let stats = aggregate(&ledger, &current_window(now(), period));
            assert_eq!(stats.balance, stats.total_income - stats.total_expense);
        }
    }

    #[test]
    fn test_excludes_before_window_and_sorts_desc() {
        let ledger = vec![
            tx(1, 10.0, TransactionKind::Expense, "Food", (2024, 2, 29)),
            tx(2, 20.0, TransactionKind::Expense, "Food", (2024, 3, 2)),
            tx(3, 30.0, TransactionKind::Expense, "Food", (2024, 3, 10)),
        ];
        let stats = aggregate(&ledger, &current_window(now(), Period::Month));
        assert_eq!(stats.total_expense, 50.0);
        let ids: Vec<i64> = stats.transactions.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn test_duplicate_ids_counted_once() {
        let entry = tx(7, 99.0, TransactionKind::Income, "Salary", (2024, 3, 3));
        let ledger = vec![entry.clone(), entry];
        let stats = aggregate(&ledger, &current_window(now(), Period::Month));
        assert_eq!(stats.total_income, 99.0);
        assert_eq!(stats.transactions.len(), 1);
    }

    #[test]
    fn test_half_open_window_excludes_upper_bound() {
        let ledger = vec![
            tx(1, 10.0, TransactionKind::Income, "Salary", (2024, 2, 1)),
            tx(2, 10.0, TransactionKind::Income, "Salary", (2024, 3, 1)),
        ];
        let window = Window::between(
            midnight(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()),
            midnight(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
        );
        let stats = aggregate(&ledger, &window);
        assert_eq!(stats.total_income, 10.0);
    }

    #[test]
    fn test_category_percentage_zero_when_no_expense() {
        let ledger = vec![
            tx(1, 0.0, TransactionKind::Expense, "Free", (2024, 3, 2)),
            tx(2, 500.0, TransactionKind::Income, "Salary", (2024, 3, 2)),
        ];
        let categories = category_rollup(&ledger, &current_window(now(), Period::Month), &[]);
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].percentage, 0.0);
        assert!(!categories[0].percentage.is_nan());
    }

    #[test]
    fn test_category_case_sensitive_and_sorted() {
        let ledger = vec![
            tx(1, 10.0, TransactionKind::Expense, "food", (2024, 3, 2)),
            tx(2, 30.0, TransactionKind::Expense, "Food", (2024, 3, 3)),
            tx(3, 60.0, TransactionKind::Expense, "Rent", (2024, 3, 4)),
        ];
        let categories = category_rollup(&ledger, &current_window(now(), Period::Month), &[]);
        let names: Vec<&str> = categories.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["Rent", "Food", "food"]);
        assert_eq!(categories[0].percentage, 60.0);
    }

    #[test]
    fn test_budget_remaining_only_for_monthly_budgets() {
        let ledger = vec![
            tx(1, 150.0, TransactionKind::Expense, "Food", (2024, 3, 5)),
            tx(2, 80.0, TransactionKind::Expense, "Travel", (2024, 3, 6)),
        ];
        let budgets = vec![
            budget(1, "Food", 400.0, BudgetPeriod::Month),
            budget(2, "Food", 500.0, BudgetPeriod::Month),
            budget(3, "Travel", 1000.0, BudgetPeriod::Year),
        ];
        let categories = category_rollup(&ledger, &current_window(now(), Period::Month), &budgets);

        let food = categories.iter().find(|c| c.category == "Food").unwrap();
        assert_eq!(food.budget_limit, Some(500.0));
        assert_eq!(food.remaining, Some(350.0));

        let travel = categories.iter().find(|c| c.category == "Travel").unwrap();
        assert!(travel.budget_limit.is_none());
        assert!(travel.remaining.is_none());
    }

    #[test]
    fn test_expense_by_category_keeps_first_seen_order() {
        let ledger = vec![
            tx(1, 5.0, TransactionKind::Expense, "B", (2024, 3, 2)),
            tx(2, 5.0, TransactionKind::Income, "A", (2024, 3, 2)),
            tx(3, 7.0, TransactionKind::Expense, "A", (2024, 3, 2)),
            tx(4, 1.0, TransactionKind::Expense, "B", (2024, 3, 2)),
        ];
        let totals = expense_by_category(&ledger);
        assert_eq!(totals, vec![("B".to_string(), 6.0), ("A".to_string(), 7.0)]);
    }
}
