//! Recurrence expansion
//!
//! Decides which calendar dates a recurring definition produces an
//! occurrence on. Storage and de-duplication of materialized entries live in
//! `db::recurring`; everything here is pure.
//!
//! The start date always carries an occurrence (it is materialized when the
//! definition is created), even when the weekday or day-of-month selector
//! would not pick it. Selectors only govern the dates after it.

use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::error::{Error, Result};
use crate::models::{Frequency, NewRecurring, NewTransaction, RecurringDefinition};

impl NewRecurring {
    /// Fill in the selector the frequency needs from the start date when the
    /// caller left it out, and drop selectors the frequency does not use.
    pub fn normalized(mut self) -> Self {
        match self.frequency {
            Frequency::Daily => {
                self.weekdays = None;
                self.day_of_month = None;
            }
            Frequency::Weekly => {
                if self.weekdays.as_ref().map_or(true, |w| w.is_empty()) {
                    self.weekdays = Some(vec![self.start_date.weekday()]);
                }
                self.day_of_month = None;
            }
            Frequency::Monthly | Frequency::Yearly => {
                if self.day_of_month.is_none() {
                    self.day_of_month = Some(self.start_date.day());
                }
                self.weekdays = None;
            }
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        crate::models::validate_amount(self.amount)?;
        if self.category.trim().is_empty() {
            return Err(Error::InvalidInput("Category must not be empty".into()));
        }
        check_selectors(
            self.frequency,
            self.weekdays.as_deref(),
            self.day_of_month,
            self.start_date,
            self.end_date,
        )
    }
}

impl RecurringDefinition {
    pub fn validate(&self) -> Result<()> {
        check_selectors(
            self.frequency,
            self.weekdays.as_deref(),
            self.day_of_month,
            self.start_date,
            self.end_date,
        )
    }
}

fn check_selectors(
    frequency: Frequency,
    weekdays: Option<&[Weekday]>,
    day_of_month: Option<u32>,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
) -> Result<()> {
    if let Some(end) = end_date {
        if end < start_date {
            return Err(Error::InvalidInput(format!(
                "End date {} is before start date {}",
                end, start_date
            )));
        }
    }

    if let Some(day) = day_of_month {
        if !(1..=31).contains(&day) {
            return Err(Error::InvalidInput(format!(
                "Day of month must be between 1 and 31, got {}",
                day
            )));
        }
    }

    let has_weekdays = weekdays.map_or(false, |w| !w.is_empty());
    let has_day = day_of_month.is_some();

    match frequency {
        Frequency::Daily if has_weekdays || has_day => Err(Error::InvalidInput(
            "Daily recurrence takes no weekday or day-of-month selector".into(),
        )),
        Frequency::Weekly if !has_weekdays || has_day => Err(Error::InvalidInput(
            "Weekly recurrence needs weekdays and no day-of-month".into(),
        )),
        Frequency::Monthly | Frequency::Yearly if !has_day || has_weekdays => {
            Err(Error::InvalidInput(format!(
                "{} recurrence needs a day-of-month and no weekdays",
                frequency
            )))
        }
        _ => Ok(()),
    }
}

/// Number of days in the month containing `date`
pub fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|next| (next - Duration::days(1)).day())
        .unwrap_or(31)
}

/// `selector` clamped to the length of the month containing `date`
fn clamped_day(selector: u32, date: NaiveDate) -> u32 {
    selector.min(days_in_month(date))
}

/// Whether `def` produces an occurrence on `date`
pub fn occurs_on(def: &RecurringDefinition, date: NaiveDate) -> bool {
    if !def.active || date < def.start_date {
        return false;
    }
    if def.end_date.map_or(false, |end| date > end) {
        return false;
    }
    if date == def.start_date {
        return true;
    }

    let selected_day = def.day_of_month.unwrap_or_else(|| def.start_date.day());
    match def.frequency {
        Frequency::Daily => true,
        Frequency::Weekly => match &def.weekdays {
            Some(days) if !days.is_empty() => days.contains(&date.weekday()),
            _ => date.weekday() == def.start_date.weekday(),
        },
        Frequency::Monthly => date.day() == clamped_day(selected_day, date),
        Frequency::Yearly => {
            date.month() == def.start_date.month() && date.day() == clamped_day(selected_day, date)
        }
    }
}

/// All occurrence dates in `[from, to]` (inclusive), ascending
pub fn occurrences_between(
    def: &RecurringDefinition,
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<NaiveDate> {
    let first = from.max(def.start_date);
    let last = match def.end_date {
        Some(end) => to.min(end),
        None => to,
    };

    let mut dates = Vec::new();
    let mut date = first;
    while date <= last {
        if occurs_on(def, date) {
            dates.push(date);
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }
    dates
}

/// Occurrence dates in `[from, to]` that are not yet materialized
pub fn pending_occurrences(
    def: &RecurringDefinition,
    from: NaiveDate,
    to: NaiveDate,
    existing: &HashSet<NaiveDate>,
) -> Vec<NaiveDate> {
    occurrences_between(def, from, to)
        .into_iter()
        .filter(|date| !existing.contains(date))
        .collect()
}

/// The concrete transaction an occurrence materializes as
pub fn occurrence_transaction(
    def: &RecurringDefinition,
    date: NaiveDate,
    suffix: &str,
) -> NewTransaction {
    NewTransaction {
        amount: def.amount,
        kind: def.kind,
        date,
        category: def.category.clone(),
        description: with_suffix(&def.description, suffix),
        has_reminder: false,
    }
}

/// Append the recurring marker unless the description already ends with it
pub fn with_suffix(description: &str, suffix: &str) -> String {
    if suffix.is_empty() || description.ends_with(suffix) {
        description.to_string()
    } else {
        format!("{}{}", description, suffix)
    }
}
