//! Domain models for Fluxo

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Direction of a ledger entry; the amount itself is always non-negative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    #[serde(alias = "entrada")]
    Income,
    #[serde(alias = "saida")]
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Human-readable label used in exports and reminder emails
    pub fn label(&self) -> &'static str {
        match self {
            Self::Income => "Entrada",
            Self::Expense => "Saída",
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" | "entrada" => Ok(Self::Income),
            "expense" | "saida" | "saída" => Ok(Self::Expense),
            _ => Err(Error::InvalidInput(format!(
                "Unknown transaction kind: {}. Available: income, expense",
                s
            ))),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub owner_id: String,
    /// Always >= 0; direction is carried by `kind`
    pub amount: f64,
    pub kind: TransactionKind,
    pub date: NaiveDate,
    pub category: String,
    pub description: String,
    pub has_reminder: bool,
    pub reminder_sent: bool,
    /// Recurring definition that generated this entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// A transaction to be inserted (before DB insertion)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    pub amount: f64,
    pub kind: TransactionKind,
    #[serde(deserialize_with = "lenient_date")]
    pub date: NaiveDate,
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub has_reminder: bool,
}

impl NewTransaction {
    pub fn validate(&self) -> Result<()> {
        validate_amount(self.amount)?;
        if self.category.trim().is_empty() {
            return Err(Error::InvalidInput("Category must not be empty".into()));
        }
        Ok(())
    }
}

/// Partial update; `None` fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionUpdate {
    pub amount: Option<f64>,
    pub kind: Option<TransactionKind>,
    #[serde(default, deserialize_with = "lenient_date_opt")]
    pub date: Option<NaiveDate>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub has_reminder: Option<bool>,
}

impl TransactionUpdate {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.kind.is_none()
            && self.date.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.has_reminder.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(amount) = self.amount {
            validate_amount(amount)?;
        }
        Ok(())
    }
}

/// Accepts `YYYY-MM-DD` as well as full RFC 3339 timestamps
fn lenient_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<NaiveDate, D::Error> {
    let s = String::deserialize(deserializer)?;
    crate::db::parse_date(&s)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", s)))
}

fn lenient_date_opt<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<NaiveDate>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        Some(s) => crate::db::parse_date(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", s))),
        None => Ok(None),
    }
}

pub(crate) fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidInput(format!(
            "Amount must be a non-negative number, got {}",
            amount
        )));
    }
    Ok(())
}

/// Recurrence frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(Error::InvalidInput(format!(
                "Unknown frequency: {}. Available: daily, weekly, monthly, yearly",
                s
            ))),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recurring transaction definition
///
/// Never hard-deleted: cancellation flips `active` to false, one way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringDefinition {
    pub id: i64,
    pub owner_id: String,
    pub amount: f64,
    pub kind: TransactionKind,
    pub category: String,
    pub description: String,
    pub frequency: Frequency,
    /// Only populated for weekly definitions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekdays: Option<Vec<Weekday>>,
    /// Only populated for monthly and yearly definitions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,
    pub start_date: NaiveDate,
    /// Inclusive
    pub end_date: Option<NaiveDate>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Recurrence block of a "make recurring" request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    #[serde(default)]
    pub weekdays: Option<Vec<Weekday>>,
    #[serde(default)]
    pub day_of_month: Option<u32>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// A recurring definition to be inserted
#[derive(Debug, Clone)]
pub struct NewRecurring {
    pub amount: f64,
    pub kind: TransactionKind,
    pub category: String,
    pub description: String,
    pub frequency: Frequency,
    pub weekdays: Option<Vec<Weekday>>,
    pub day_of_month: Option<u32>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl NewRecurring {
    /// Build a definition from a submitted transaction and its recurrence rule.
    /// The transaction's date becomes the start date.
    pub fn from_transaction(tx: &NewTransaction, rule: &RecurrenceRule) -> Self {
        Self {
            amount: tx.amount,
            kind: tx.kind,
            category: tx.category.clone(),
            description: tx.description.clone(),
            frequency: rule.frequency,
            weekdays: rule.weekdays.clone(),
            day_of_month: rule.day_of_month,
            start_date: tx.date,
            end_date: rule.end_date,
        }
    }
}

/// Budget period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    #[serde(alias = "monthly")]
    Month,
    #[serde(alias = "yearly")]
    Year,
}

impl BudgetPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl std::str::FromStr for BudgetPeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "month" | "monthly" => Ok(Self::Month),
            "year" | "yearly" => Ok(Self::Year),
            _ => Err(Error::InvalidInput(format!(
                "Unknown budget period: {}. Available: month, year",
                s
            ))),
        }
    }
}

/// A spending limit for one category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub owner_id: String,
    pub category: String,
    pub limit: f64,
    pub period: BudgetPeriod,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBudget {
    pub category: String,
    pub limit: f64,
    #[serde(default = "default_budget_period")]
    pub period: BudgetPeriod,
}

fn default_budget_period() -> BudgetPeriod {
    BudgetPeriod::Month
}

/// A reusable transaction shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: i64,
    pub owner_id: String,
    pub name: String,
    pub amount: f64,
    pub kind: TransactionKind,
    pub category: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTemplate {
    pub name: String,
    pub amount: f64,
    pub kind: TransactionKind,
    pub category: String,
    #[serde(default)]
    pub description: String,
}

// ========== Derived views ==========

/// Everything read from the store for one owner in a single scan
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    pub transactions: Vec<Transaction>,
    /// Rows whose stored date could not be parsed
    pub skipped: usize,
}

/// Totals for a time window
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeriodStats {
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
    pub transactions: Vec<Transaction>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub skipped_records: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

/// Monthly expense rollup for one category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: String,
    pub total: f64,
    pub percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_limit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<f64>,
}

/// Current vs previous period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodComparison {
    pub current_period: PeriodStats,
    pub previous_period: PeriodStats,
    /// Percent; 0 when the previous income was 0
    pub income_change: f64,
    /// Percent; 0 when the previous expense was 0
    pub expense_change: f64,
    /// Absolute difference
    pub balance_change: f64,
}
