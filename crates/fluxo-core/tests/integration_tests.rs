//! Integration tests for fluxo-core
//!
//! These tests exercise the full create recurring → sweep → stats → reminders
//! workflow against a throwaway database.

use chrono::{NaiveDate, TimeZone, Utc};
use fluxo_core::{
    db::Database,
    models::{Frequency, NewTransaction, RecurrenceRule, TransactionKind},
    window::Period,
    Error, LedgerConfig, MockBackend, MockSender, ReminderDispatcher, TransactionFilter,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn salary() -> NewTransaction {
    NewTransaction {
        amount: 5000.0,
        kind: TransactionKind::Income,
        date: date(2024, 3, 1),
        category: "Salary".into(),
        description: "ACME".into(),
        has_reminder: false,
    }
}

fn weekly_gym() -> (NewTransaction, RecurrenceRule) {
    (
        NewTransaction {
            amount: 40.0,
            kind: TransactionKind::Expense,
            date: date(2024, 3, 4),
            category: "Health".into(),
            description: "Academia".into(),
            has_reminder: true,
        },
        RecurrenceRule {
            frequency: Frequency::Weekly,
            weekdays: None,
            day_of_month: None,
            end_date: None,
        },
    )
}

#[test]
fn test_recurring_sweep_feeds_stats() {
    let db = Database::in_memory().expect("Failed to create database");
    let config = LedgerConfig::default();

    db.insert_transaction("alice", &salary())
        .expect("Failed to insert salary");
    let (tx, rule) = weekly_gym();
    let (def, _) = db
        .create_recurring("alice", &tx, &rule, &config.recurring_suffix)
        .expect("Failed to create recurring");

    // Mondays after the 4th: 11, 18, 25
    let summary = db
        .sweep_recurring(date(2024, 3, 25), &config.recurring_suffix)
        .expect("Sweep failed");
    assert_eq!(summary.created, 3);

    // Running the sweep again changes nothing
    let again = db
        .sweep_recurring(date(2024, 3, 25), &config.recurring_suffix)
        .expect("Sweep failed");
    assert_eq!(again.created, 0);

    let now = Utc.with_ymd_and_hms(2024, 3, 26, 12, 0, 0).unwrap();
    let stats = db
        .period_stats("alice", Period::Month, now, &config)
        .expect("Stats failed");
    assert_eq!(stats.total_income, 5000.0);
    assert_eq!(stats.total_expense, 160.0);
    assert_eq!(stats.balance, 4840.0);
    assert_eq!(stats.transactions.len(), 5);
    assert!(stats
        .transactions
        .iter()
        .filter(|t| t.recurring_id == Some(def.id))
        .all(|t| t.description == "Academia (Recorrente)"));

    let week = db
        .period_stats("alice", Period::Week, now, &config)
        .expect("Stats failed");
    assert_eq!(week.total_expense, 40.0);
    assert_eq!(week.total_income, 0.0);
}

#[test]
fn test_export_reflects_store() {
    let db = Database::in_memory().expect("Failed to create database");
    db.insert_transaction("alice", &salary())
        .expect("Failed to insert salary");

    let csv = db
        .export_transactions_csv(TransactionFilter::new("alice"), 100)
        .expect("Export failed");
    assert!(csv.contains("01/03/2024,Entrada,Salary,ACME,\"R$ 5.000,00\""));

    let other = db
        .export_transactions_csv(TransactionFilter::new("bob"), 100)
        .expect("Export failed");
    assert_eq!(other.lines().count(), 1);
}

#[tokio::test]
async fn test_reminder_dispatch_marks_sent() {
    let db = Database::in_memory().expect("Failed to create database");
    let config = LedgerConfig::default();
    let (tx, rule) = weekly_gym();
    db.create_recurring("alice", &tx, &rule, &config.recurring_suffix)
        .expect("Failed to create recurring");

    let now = Utc.with_ymd_and_hms(2024, 3, 3, 18, 0, 0).unwrap();
    let sender = MockSender::new();
    let dispatcher = ReminderDispatcher::new(&db, &sender, &config);

    let report = dispatcher
        .dispatch("alice", "alice@example.com", now)
        .await
        .expect("Dispatch failed");
    assert_eq!(report.email_id.as_deref(), Some("mock-1"));
    assert_eq!(report.reminded.len(), 1);

    let sent = sender.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec!["alice@example.com".to_string()]);
    assert!(sent[0].html.contains("Academia (Recorrente)"));

    // Already delivered: nothing left to send
    let second = dispatcher
        .dispatch("alice", "alice@example.com", now)
        .await
        .expect("Dispatch failed");
    assert!(second.email_id.is_none());
    assert_eq!(sender.sent().len(), 1);
}

#[tokio::test]
async fn test_failed_delivery_keeps_reminders_pending() {
    let db = Database::in_memory().expect("Failed to create database");
    let config = LedgerConfig::default();
    let (tx, rule) = weekly_gym();
    db.create_recurring("alice", &tx, &rule, &config.recurring_suffix)
        .expect("Failed to create recurring");

    let now = Utc.with_ymd_and_hms(2024, 3, 3, 18, 0, 0).unwrap();
    let sender = MockSender::failing();
    let dispatcher = ReminderDispatcher::new(&db, &sender, &config);

    let result = dispatcher.dispatch("alice", "alice@example.com", now).await;
    assert!(matches!(result, Err(Error::DependencyFailure(_))));

    let pending = db
        .pending_reminders("alice", now, &config)
        .expect("Reminder query failed");
    assert_eq!(pending.len(), 1);
}

#[tokio::test]
async fn test_tips_fall_back_when_generator_fails() {
    let db = Database::in_memory().expect("Failed to create database");
    let config = LedgerConfig::default();
    db.insert_transaction("alice", &salary())
        .expect("Failed to insert salary");

    let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
    let stats = db
        .period_stats("alice", Period::Month, now, &config)
        .expect("Stats failed");

    let response =
        fluxo_core::generate_tips(&MockBackend::failing(), Period::Month, stats, &config).await;
    assert!(response.fallback);
    assert_eq!(response.tips, config.fallback_tip);
    assert_eq!(response.stats.total_income, 5000.0);
}
