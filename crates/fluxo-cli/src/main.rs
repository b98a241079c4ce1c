//! Fluxo CLI - Personal cash-flow ledger
//!
//! Usage:
//!   fluxo init                       Initialize database
//!   fluxo transactions add 42 -c Food
//!   fluxo stats month                Period statistics
//!   fluxo recurring add 1200 -f monthly -c Rent
//!   fluxo serve --port 3000          Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref())?;
    let owner = cli.owner.as_str();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Serve {
            port,
            host,
            no_auth,
        } => commands::cmd_serve(&cli.db, &host, port, no_auth, config).await,
        Commands::Transactions { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                None => commands::cmd_transactions_list(
                    &db,
                    owner,
                    &commands::ListOptions::default(),
                ),
                Some(TransactionsAction::List {
                    limit,
                    category,
                    kind,
                    search,
                    from,
                    to,
                }) => commands::cmd_transactions_list(
                    &db,
                    owner,
                    &commands::ListOptions {
                        limit,
                        category,
                        kind,
                        search,
                        from,
                        to,
                    },
                ),
                Some(TransactionsAction::Add {
                    amount,
                    kind,
                    category,
                    description,
                    date,
                    reminder,
                }) => commands::cmd_transactions_add(
                    &db,
                    owner,
                    &commands::AddOptions {
                        amount,
                        kind,
                        category,
                        description,
                        date,
                        reminder,
                    },
                ),
                Some(TransactionsAction::Delete { id }) => {
                    commands::cmd_transactions_delete(&db, owner, id)
                }
            }
        }
        Commands::Stats { period } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_stats(&db, owner, &period, &config)
        }
        Commands::Categories => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_categories(&db, owner, &config)
        }
        Commands::Compare => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_compare(&db, owner, &config)
        }
        Commands::Recurring { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                None | Some(RecurringAction::List) => commands::cmd_recurring_list(&db, owner),
                Some(RecurringAction::Add {
                    amount,
                    frequency,
                    kind,
                    category,
                    description,
                    start,
                    weekdays,
                    day,
                    until,
                }) => commands::cmd_recurring_add(
                    &db,
                    owner,
                    &commands::RecurringOptions {
                        amount,
                        frequency,
                        kind,
                        category,
                        description,
                        start,
                        weekdays,
                        day,
                        until,
                    },
                    &config,
                ),
                Some(RecurringAction::Cancel { id }) => {
                    commands::cmd_recurring_cancel(&db, owner, id)
                }
                Some(RecurringAction::Materialize { id, through }) => {
                    commands::cmd_recurring_materialize(
                        &db,
                        owner,
                        id,
                        through.as_deref(),
                        &config,
                    )
                }
            }
        }
        Commands::Budgets { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                None | Some(BudgetsAction::List) => commands::cmd_budgets_list(&db, owner),
                Some(BudgetsAction::Set {
                    category,
                    limit,
                    period,
                }) => commands::cmd_budgets_set(&db, owner, &category, limit, &period),
                Some(BudgetsAction::Delete { id }) => commands::cmd_budgets_delete(&db, owner, id),
            }
        }
        Commands::Reminders { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                None | Some(RemindersAction::List) => {
                    commands::cmd_reminders_list(&db, owner, &config)
                }
                Some(RemindersAction::Send { to }) => {
                    commands::cmd_reminders_send(&db, owner, &to, &config).await
                }
            }
        }
        Commands::Tips { period } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_tips(&db, owner, &period, &config).await
        }
        Commands::Export { output, from, to } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_export(
                &db,
                owner,
                output.as_deref(),
                from.as_deref(),
                to.as_deref(),
                &config,
            )
        }
        Commands::Sweep { through } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_sweep(&db, through.as_deref(), &config)
        }
    }
}
