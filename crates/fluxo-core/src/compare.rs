//! Period-over-period comparison

use crate::models::{PeriodComparison, PeriodStats};

/// `100 * (current - previous) / previous`, or 0 when `previous` is not positive
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        100.0 * (current - previous) / previous
    } else {
        0.0
    }
}

pub fn compare(current: PeriodStats, previous: PeriodStats) -> PeriodComparison {
    PeriodComparison {
        income_change: percent_change(current.total_income, previous.total_income),
        expense_change: percent_change(current.total_expense, previous.total_expense),
        balance_change: current.balance - previous.balance,
        current_period: current,
        previous_period: previous,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(income: f64, expense: f64) -> PeriodStats {
        PeriodStats {
            total_income: income,
            total_expense: expense,
            balance: income - expense,
            ..Default::default()
        }
    }

    #[test]
    fn test_changes() {
        let result = compare(stats(1500.0, 900.0), stats(1000.0, 1200.0));
        assert_eq!(result.income_change, 50.0);
        assert_eq!(result.expense_change, -25.0);
        assert_eq!(result.balance_change, 600.0 - (-200.0));
    }

    #[test]
    fn test_zero_previous_is_zero_change() {
        let result = compare(stats(800.0, 300.0), stats(0.0, 0.0));
        assert_eq!(result.income_change, 0.0);
        assert_eq!(result.expense_change, 0.0);
        assert!(!result.income_change.is_nan());
        assert_eq!(result.balance_change, 500.0);
    }

    #[test]
    fn test_balance_change_can_be_negative_from_zero() {
        let result = compare(stats(0.0, 50.0), stats(0.0, 0.0));
        assert_eq!(result.balance_change, -50.0);
    }
}
