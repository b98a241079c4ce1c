//! Fluxo Core Library
//!
//! Shared functionality for the Fluxo personal cash-flow ledger:
//! - SQLite ledger store and migrations
//! - Time windows, aggregation and category/budget rollups
//! - Recurring transaction expansion and the materialization sweep
//! - Period comparison and reminder selection
//! - Pluggable text generation (tips) and email delivery (reminders)
//! - CSV export

pub mod aggregate;
pub mod ai;
pub mod compare;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod export;
pub mod models;
pub mod recurrence;
pub mod reminders;
pub mod tips;
pub mod window;

pub use ai::{AIClient, MockBackend, OllamaBackend, OpenAICompatibleBackend, TextGenerator};
pub use config::LedgerConfig;
pub use db::{Database, MaterializeResult, SweepSummary, TransactionFilter};
pub use email::{EmailClient, EmailMessage, EmailSender, MockSender, ResendSender};
pub use error::{Error, Result};
pub use reminders::{DispatchReport, ReminderDispatcher};
pub use tips::{generate_tips, TipsResponse};
pub use window::{Period, Window};
