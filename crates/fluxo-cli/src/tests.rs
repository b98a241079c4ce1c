//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use chrono::{Datelike, NaiveDate, Weekday};
use clap::Parser;
use fluxo_core::db::Database;
use fluxo_core::models::{NewTransaction, TransactionKind};
use fluxo_core::LedgerConfig;

use crate::cli::{BudgetsAction, Cli, Commands, RecurringAction, TransactionsAction};
use crate::commands::{self, truncate};

const OWNER: &str = "local";

fn setup_test_db() -> Database {
    Database::in_memory().unwrap()
}

fn add_expense(db: &Database, amount: f64, category: &str, date: NaiveDate) -> i64 {
    db.insert_transaction(
        OWNER,
        &NewTransaction {
            amount,
            kind: TransactionKind::Expense,
            date,
            category: category.into(),
            description: format!("{} purchase", category),
            has_reminder: false,
        },
    )
    .unwrap()
}

fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_global_args() {
    let cli = Cli::try_parse_from([
        "fluxo", "--db", "ledger.db", "--owner", "alice", "-v", "stats", "week",
    ])
    .unwrap();
    assert_eq!(cli.db.to_str(), Some("ledger.db"));
    assert_eq!(cli.owner, "alice");
    assert!(cli.verbose);
    match cli.command {
        Commands::Stats { period } => assert_eq!(period, "week"),
        _ => panic!("expected stats"),
    }
}

#[test]
fn test_parse_defaults() {
    let cli = Cli::try_parse_from(["fluxo", "stats"]).unwrap();
    assert_eq!(cli.db.to_str(), Some("fluxo.db"));
    assert_eq!(cli.owner, "local");
    assert!(cli.config.is_none());
    match cli.command {
        Commands::Stats { period } => assert_eq!(period, "month"),
        _ => panic!("expected stats"),
    }
}

#[test]
fn test_parse_transactions_add() {
    let cli = Cli::try_parse_from([
        "fluxo",
        "transactions",
        "add",
        "42.5",
        "-c",
        "Food",
        "-d",
        "Lunch",
        "--date",
        "2024-03-10",
        "--reminder",
    ])
    .unwrap();
    match cli.command {
        Commands::Transactions {
            action:
                Some(TransactionsAction::Add {
                    amount,
                    kind,
                    category,
                    description,
                    date,
                    reminder,
                }),
        } => {
            assert_eq!(amount, 42.5);
            assert_eq!(kind, "expense");
            assert_eq!(category, "Food");
            assert_eq!(description, "Lunch");
            assert_eq!(date.as_deref(), Some("2024-03-10"));
            assert!(reminder);
        }
        _ => panic!("expected transactions add"),
    }
}

#[test]
fn test_parse_recurring_add() {
    let cli = Cli::try_parse_from([
        "fluxo",
        "recurring",
        "add",
        "80",
        "-f",
        "weekly",
        "-c",
        "Gym",
        "--weekdays",
        "mon,thu",
        "--until",
        "2024-12-31",
    ])
    .unwrap();
    match cli.command {
        Commands::Recurring {
            action:
                Some(RecurringAction::Add {
                    frequency,
                    weekdays,
                    day,
                    until,
                    ..
                }),
        } => {
            assert_eq!(frequency, "weekly");
            assert_eq!(weekdays.as_deref(), Some("mon,thu"));
            assert!(day.is_none());
            assert_eq!(until.as_deref(), Some("2024-12-31"));
        }
        _ => panic!("expected recurring add"),
    }
}

#[test]
fn test_parse_serve_and_budgets() {
    let cli = Cli::try_parse_from(["fluxo", "serve", "--port", "8080", "--no-auth"]).unwrap();
    match cli.command {
        Commands::Serve {
            port,
            host,
            no_auth,
        } => {
            assert_eq!(port, 8080);
            assert_eq!(host, "127.0.0.1");
            assert!(no_auth);
        }
        _ => panic!("expected serve"),
    }

    let cli = Cli::try_parse_from(["fluxo", "budgets", "set", "Food", "800"]).unwrap();
    match cli.command {
        Commands::Budgets {
            action:
                Some(BudgetsAction::Set {
                    category,
                    limit,
                    period,
                }),
        } => {
            assert_eq!(category, "Food");
            assert_eq!(limit, 800.0);
            assert_eq!(period, "month");
        }
        _ => panic!("expected budgets set"),
    }
}

#[test]
fn test_parse_rejects_missing_category() {
    assert!(Cli::try_parse_from(["fluxo", "transactions", "add", "10"]).is_err());
}

// ========== Shared Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a longer description", 10), "a longe...");
    // Multi-byte characters are not split
    assert_eq!(truncate("Café da manhã completo", 8), "Café ...");
}

#[test]
fn test_parse_date_arg() {
    assert_eq!(commands::parse_date_arg("from", None).unwrap(), None);
    assert_eq!(commands::parse_date_arg("from", Some("  ")).unwrap(), None);
    assert_eq!(
        commands::parse_date_arg("from", Some("2024-02-29")).unwrap(),
        NaiveDate::from_ymd_opt(2024, 2, 29)
    );
    let err = commands::parse_date_arg("from", Some("29/02/2024")).unwrap_err();
    assert!(err.to_string().contains("--from"));
}

#[test]
fn test_parse_weekdays() {
    assert_eq!(
        commands::parse_weekdays("mon, Thu").unwrap(),
        vec![Weekday::Mon, Weekday::Thu]
    );
    assert_eq!(
        commands::parse_weekdays("friday").unwrap(),
        vec![Weekday::Fri]
    );
    assert!(commands::parse_weekdays("mon,someday").is_err());
}

#[test]
fn test_load_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "fetch_limit = 50\nupcoming_days = 7\n").unwrap();

    let config = commands::load_config(Some(&path)).unwrap();
    assert_eq!(config.upcoming_days, 7);
}

#[test]
fn test_load_config_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = commands::load_config(Some(&dir.path().join("absent.toml"))).unwrap();
    assert_eq!(config.upcoming_days, LedgerConfig::default().upcoming_days);
}

#[test]
fn test_load_config_rejects_malformed_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "upcoming_days = \"soon\"\n").unwrap();
    assert!(commands::load_config(Some(&path)).is_err());
}

#[test]
fn test_cmd_init_creates_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fluxo.db");
    commands::cmd_init(&path).unwrap();
    assert!(path.exists());
}

// ========== Transaction Command Tests ==========

#[test]
fn test_cmd_transactions_add_and_list() {
    let db = setup_test_db();
    let opts = commands::AddOptions {
        amount: 42.5,
        kind: "expense".into(),
        category: " Food ".into(),
        description: "Lunch".into(),
        date: Some("2024-03-10".into()),
        reminder: true,
    };
    commands::cmd_transactions_add(&db, OWNER, &opts).unwrap();

    let stored = db.list_transactions(OWNER, 10).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].category, "Food");
    assert_eq!(stored[0].date, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    assert!(stored[0].has_reminder);

    let result = commands::cmd_transactions_list(&db, OWNER, &commands::ListOptions::default());
    assert!(result.is_ok());
}

#[test]
fn test_cmd_transactions_add_defaults_to_today() {
    let db = setup_test_db();
    let opts = commands::AddOptions {
        amount: 10.0,
        kind: "income".into(),
        category: "Salary".into(),
        description: String::new(),
        date: None,
        reminder: false,
    };
    commands::cmd_transactions_add(&db, OWNER, &opts).unwrap();

    let stored = db.list_transactions(OWNER, 10).unwrap();
    assert_eq!(stored[0].date, today());
    assert_eq!(stored[0].kind, TransactionKind::Income);
}

#[test]
fn test_cmd_transactions_add_rejects_bad_input() {
    let db = setup_test_db();
    let mut opts = commands::AddOptions {
        amount: 10.0,
        kind: "transfer".into(),
        category: "Food".into(),
        description: String::new(),
        date: None,
        reminder: false,
    };
    assert!(commands::cmd_transactions_add(&db, OWNER, &opts).is_err());

    opts.kind = "expense".into();
    opts.amount = -5.0;
    assert!(commands::cmd_transactions_add(&db, OWNER, &opts).is_err());

    assert!(db.list_transactions(OWNER, 10).unwrap().is_empty());
}

#[test]
fn test_cmd_transactions_list_with_filters() {
    let db = setup_test_db();
    add_expense(&db, 20.0, "Food", NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());

    let opts = commands::ListOptions {
        category: Some("Food".into()),
        kind: Some("expense".into()),
        from: Some("2024-01-01".into()),
        to: Some("2024-01-31".into()),
        ..Default::default()
    };
    assert!(commands::cmd_transactions_list(&db, OWNER, &opts).is_ok());

    let bad = commands::ListOptions {
        kind: Some("transfer".into()),
        ..Default::default()
    };
    assert!(commands::cmd_transactions_list(&db, OWNER, &bad).is_err());
}

#[test]
fn test_cmd_transactions_delete() {
    let db = setup_test_db();
    let id = add_expense(&db, 20.0, "Food", today());

    commands::cmd_transactions_delete(&db, OWNER, id).unwrap();
    assert!(db.list_transactions(OWNER, 10).unwrap().is_empty());

    // Second delete finds nothing
    assert!(commands::cmd_transactions_delete(&db, OWNER, id).is_err());
}

#[test]
fn test_cmd_transactions_delete_other_owner() {
    let db = setup_test_db();
    let id = add_expense(&db, 20.0, "Food", today());

    assert!(commands::cmd_transactions_delete(&db, "bob", id).is_err());
    assert_eq!(db.list_transactions(OWNER, 10).unwrap().len(), 1);
}

// ========== Report Command Tests ==========

#[test]
fn test_cmd_stats() {
    let db = setup_test_db();
    let config = LedgerConfig::default();
    add_expense(&db, 20.0, "Food", today());

    assert!(commands::cmd_stats(&db, OWNER, "week", &config).is_ok());
    assert!(commands::cmd_stats(&db, OWNER, "YEAR", &config).is_ok());
    assert!(commands::cmd_stats(&db, OWNER, "decade", &config).is_err());
}

#[test]
fn test_cmd_categories_and_compare() {
    let db = setup_test_db();
    let config = LedgerConfig::default();

    // Empty ledger is fine
    assert!(commands::cmd_categories(&db, OWNER, &config).is_ok());
    assert!(commands::cmd_compare(&db, OWNER, &config).is_ok());

    add_expense(&db, 20.0, "Food", today());
    commands::cmd_budgets_set(&db, OWNER, "Food", 10.0, "month").unwrap();
    assert!(commands::cmd_categories(&db, OWNER, &config).is_ok());
    assert!(commands::cmd_compare(&db, OWNER, &config).is_ok());
}

#[test]
fn test_compare_balance_change_is_currency() {
    assert_eq!(
        commands::signed_amount(4850.0),
        "\x1b[32m+R$ 4.850,00\x1b[0m"
    );
    assert_eq!(commands::signed_amount(-12.5), "\x1b[31m-R$ 12,50\x1b[0m");
    assert_eq!(commands::signed_amount(0.001), "R$ 0,00");
    assert!(!commands::signed_amount(4850.0).contains('%'));

    assert_eq!(commands::signed_percent(25.0), "\x1b[32m+25.0%\x1b[0m");
    assert_eq!(commands::signed_percent(0.0), "0.0%");
}

#[tokio::test]
async fn test_cmd_tips_falls_back_without_generator() {
    std::env::remove_var("AI_BACKEND");
    std::env::remove_var("OLLAMA_HOST");

    let db = setup_test_db();
    let config = LedgerConfig::default();
    assert!(commands::cmd_tips(&db, OWNER, "month", &config).await.is_ok());
    assert!(commands::cmd_tips(&db, OWNER, "fortnight", &config).await.is_err());
}

// ========== Recurring Command Tests ==========

fn recurring_opts(frequency: &str, start: &str) -> commands::RecurringOptions {
    commands::RecurringOptions {
        amount: 1200.0,
        frequency: frequency.into(),
        kind: "expense".into(),
        category: "Rent".into(),
        description: "Aluguel".into(),
        start: Some(start.into()),
        weekdays: None,
        day: None,
        until: None,
    }
}

#[test]
fn test_cmd_recurring_add_creates_first_occurrence() {
    let db = setup_test_db();
    let config = LedgerConfig::default();

    commands::cmd_recurring_add(&db, OWNER, &recurring_opts("monthly", "2024-01-31"), &config)
        .unwrap();

    let defs = db.list_recurring(OWNER).unwrap();
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0].day_of_month, Some(31));

    let txs = db.list_transactions(OWNER, 10).unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].description, "Aluguel (Recorrente)");
    assert_eq!(txs[0].recurring_id, Some(defs[0].id));

    assert!(commands::cmd_recurring_list(&db, OWNER).is_ok());
}

#[test]
fn test_cmd_recurring_add_weekly_with_weekdays() {
    let db = setup_test_db();
    let config = LedgerConfig::default();
    let opts = commands::RecurringOptions {
        weekdays: Some("mon,thu".into()),
        ..recurring_opts("weekly", "2024-03-04")
    };

    commands::cmd_recurring_add(&db, OWNER, &opts, &config).unwrap();

    let defs = db.list_recurring(OWNER).unwrap();
    assert_eq!(defs[0].weekdays, Some(vec![Weekday::Mon, Weekday::Thu]));
}

#[test]
fn test_cmd_recurring_add_rejects_bad_rule() {
    let db = setup_test_db();
    let config = LedgerConfig::default();
    let opts = commands::RecurringOptions {
        day: Some(32),
        ..recurring_opts("monthly", "2024-03-04")
    };
    assert!(commands::cmd_recurring_add(&db, OWNER, &opts, &config).is_err());

    let opts = commands::RecurringOptions {
        until: Some("2024-03-01".into()),
        ..recurring_opts("monthly", "2024-03-04")
    };
    assert!(commands::cmd_recurring_add(&db, OWNER, &opts, &config).is_err());

    let opts = commands::RecurringOptions {
        weekdays: Some("mon,funday".into()),
        ..recurring_opts("weekly", "2024-03-04")
    };

    assert!(commands::cmd_recurring_add(&db, OWNER, &opts, &config).is_err());
    assert!(db.list_recurring(OWNER).unwrap().is_empty());
    assert!(db.list_transactions(OWNER, 10).unwrap().is_empty());
}

#[test]
fn test_cmd_recurring_materialize_and_cancel() {
    let db = setup_test_db();
    let config = LedgerConfig::default();

    commands::cmd_recurring_add(&db, OWNER, &recurring_opts("monthly", "2024-01-31"), &config)
        .unwrap();
    let id = db.list_recurring(OWNER).unwrap()[0].id;

    commands::cmd_recurring_materialize(&db, OWNER, id, Some("2024-04-30"), &config).unwrap();
    let dates: Vec<_> = db
        .list_transactions(OWNER, 10)
        .unwrap()
        .iter()
        .map(|t| (t.date.month(), t.date.day()))
        .collect();
    assert_eq!(dates, vec![(4, 30), (3, 31), (2, 29), (1, 31)]);

    // Running again creates nothing new
    commands::cmd_recurring_materialize(&db, OWNER, id, Some("2024-04-30"), &config).unwrap();
    assert_eq!(db.list_transactions(OWNER, 10).unwrap().len(), 4);

    commands::cmd_recurring_cancel(&db, OWNER, id).unwrap();
    commands::cmd_recurring_materialize(&db, OWNER, id, Some("2024-06-30"), &config).unwrap();
    assert_eq!(db.list_transactions(OWNER, 10).unwrap().len(), 4);
}

#[test]
fn test_cmd_recurring_materialize_unknown_id() {
    let db = setup_test_db();
    let config = LedgerConfig::default();
    assert!(commands::cmd_recurring_materialize(&db, OWNER, 999, None, &config).is_err());
}

#[test]
fn test_cmd_sweep_through_date() {
    let db = setup_test_db();
    let config = LedgerConfig::default();

    let mut opts = recurring_opts("daily", "2024-05-01");
    opts.amount = 3.5;
    commands::cmd_recurring_add(&db, OWNER, &opts, &config).unwrap();
    commands::cmd_recurring_add(&db, "bob", &opts, &config).unwrap();

    commands::cmd_sweep(&db, Some("2024-05-03"), &config).unwrap();
    assert_eq!(db.list_transactions(OWNER, 10).unwrap().len(), 3);
    assert_eq!(db.list_transactions("bob", 10).unwrap().len(), 3);

    assert!(commands::cmd_sweep(&db, Some("not-a-date"), &config).is_err());
}

#[test]
fn test_through_past_horizon_is_rejected() {
    let db = setup_test_db();
    let mut config = LedgerConfig::default();

    commands::cmd_recurring_add(&db, OWNER, &recurring_opts("daily", "2024-05-01"), &config)
        .unwrap();
    let id = db.list_recurring(OWNER).unwrap()[0].id;
    let before = db.list_transactions(OWNER, 10).unwrap().len();

    assert!(commands::cmd_recurring_materialize(&db, OWNER, id, Some("9999-12-31"), &config).is_err());
    assert!(commands::cmd_sweep(&db, Some("9999-12-31"), &config).is_err());
    assert_eq!(db.list_transactions(OWNER, 10).unwrap().len(), before);

    config.sweep.horizon_days = 7;
    let week = (today() + chrono::Duration::days(7)).to_string();
    let late = (today() + chrono::Duration::days(8)).to_string();
    assert_eq!(
        commands::bounded_through(Some(&week), &config).unwrap(),
        Some(today() + chrono::Duration::days(7))
    );
    assert!(commands::bounded_through(Some(&late), &config).is_err());
    assert_eq!(commands::bounded_through(None, &config).unwrap(), None);
}

// ========== Budget Command Tests ==========

#[test]
fn test_cmd_budgets_lifecycle() {
    let db = setup_test_db();

    assert!(commands::cmd_budgets_list(&db, OWNER).is_ok());
    commands::cmd_budgets_set(&db, OWNER, "Food", 800.0, "month").unwrap();
    assert!(commands::cmd_budgets_set(&db, OWNER, "Food", 100.0, "weekly").is_err());

    let budgets = db.list_budgets(OWNER).unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0].limit, 800.0);
    assert!(commands::cmd_budgets_list(&db, OWNER).is_ok());

    commands::cmd_budgets_delete(&db, OWNER, budgets[0].id).unwrap();
    assert!(db.list_budgets(OWNER).unwrap().is_empty());
    assert!(commands::cmd_budgets_delete(&db, OWNER, budgets[0].id).is_err());
}

// ========== Reminder Command Tests ==========

#[test]
fn test_cmd_reminders_list() {
    let db = setup_test_db();
    let config = LedgerConfig::default();
    db.insert_transaction(
        OWNER,
        &NewTransaction {
            amount: 150.0,
            kind: TransactionKind::Expense,
            date: today(),
            category: "Bills".into(),
            description: "Conta de luz".into(),
            has_reminder: true,
        },
    )
    .unwrap();

    assert!(commands::cmd_reminders_list(&db, OWNER, &config).is_ok());
}

// ========== Export Command Tests ==========

#[test]
fn test_cmd_export_to_file() {
    let db = setup_test_db();
    let config = LedgerConfig::default();
    add_expense(&db, 1234.56, "Food", NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    add_expense(&db, 10.0, "Food", NaiveDate::from_ymd_opt(2023, 12, 1).unwrap());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    commands::cmd_export(&db, OWNER, Some(&path), Some("2024-01-01"), None, &config).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "Data,Tipo,Categoria,Descrição,Valor");
    assert!(lines[1].starts_with("10/03/2024,Saída,Food,"));
    assert!(lines[1].contains("R$ 1.234,56"));
}
