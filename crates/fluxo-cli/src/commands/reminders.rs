//! Reminder command implementations

use anyhow::{Context, Result};
use chrono::Utc;
use fluxo_core::db::Database;
use fluxo_core::export::format_date_br;
use fluxo_core::{EmailClient, EmailSender, LedgerConfig, ReminderDispatcher};

use super::{colored_amount, truncate};

pub fn cmd_reminders_list(db: &Database, owner: &str, config: &LedgerConfig) -> Result<()> {
    let reminders = db.pending_reminders(owner, Utc::now(), config)?;

    if reminders.is_empty() {
        println!("No reminders due.");
        return Ok(());
    }

    println!();
    println!("🔔 Due Reminders");
    println!("   ─────────────────────────────────────────────────────────────");
    for tx in reminders {
        println!(
            "   #{:<5} {} │ {:>22} │ {}",
            tx.id,
            format_date_br(tx.date),
            colored_amount(tx.kind, tx.amount),
            truncate(&tx.description, 40)
        );
    }

    Ok(())
}

pub async fn cmd_reminders_send(
    db: &Database,
    owner: &str,
    to: &str,
    config: &LedgerConfig,
) -> Result<()> {
    let client = EmailClient::from_env()
        .context("Email delivery is not configured (set RESEND_API_KEY)")?;

    println!("📧 Sending reminders to {} via {}...", to, client.name());

    let report = ReminderDispatcher::new(db, &client, config)
        .dispatch(owner, to, Utc::now())
        .await?;

    match report.email_id {
        Some(id) => println!(
            "✅ Sent {} reminder(s) (message {})",
            report.reminded.len(),
            id
        ),
        None => println!("No reminders due, nothing sent."),
    }

    Ok(())
}
