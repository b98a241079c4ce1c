//! Period windows
//!
//! All windows are computed in UTC. Current week/month/year windows are
//! open-ended through "now"; the previous-month window is half-open and ends
//! at the current month's start.

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Aggregation period selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Week,
    Month,
    Year,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl std::str::FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(Error::InvalidInput(format!(
                "Unknown period: {}. Available: week, month, year",
                s
            ))),
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Left-closed time interval, optionally bounded above (exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl Window {
    pub fn since(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }

    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// A calendar date is inside when its UTC midnight is >= start and < end
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        let instant = midnight(date);
        instant >= self.start && self.end.map_or(true, |end| instant < end)
    }
}

/// UTC midnight of a calendar date
pub fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// `date` plus `days` (negative counts as 0), saturating at the last representable date
pub fn days_after(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_days(Days::new(days.max(0).unsigned_abs()))
        .unwrap_or(NaiveDate::MAX)
}

/// Monday of the week containing `date` (ISO: Monday = 0 ... Sunday = 6)
pub fn week_start_date(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn month_start_date(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

pub fn year_start_date(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.ordinal0() as i64)
}

/// First day of the month before the one containing `date`
pub fn previous_month_start_date(date: NaiveDate) -> NaiveDate {
    month_start_date(month_start_date(date) - Duration::days(1))
}

/// Inclusive lower bound of the current period
pub fn period_start(now: DateTime<Utc>, period: Period) -> DateTime<Utc> {
    let today = now.date_naive();
    let start = match period {
        Period::Week => week_start_date(today),
        Period::Month => month_start_date(today),
        Period::Year => year_start_date(today),
    };
    midnight(start)
}

/// Open-ended window for the current period
pub fn current_window(now: DateTime<Utc>, period: Period) -> Window {
    Window::since(period_start(now, period))
}

/// `[previous month start, current month start)`
pub fn previous_month_window(now: DateTime<Utc>) -> Window {
    let today = now.date_naive();
    Window::between(
        midnight(previous_month_start_date(today)),
        midnight(month_start_date(today)),
    )
}
