//! Reminder selection and delivery
//!
//! Selection is pure. Delivery (`ReminderDispatcher`) sends one digest email
//! per request and flags the included entries as sent only after the email
//! collaborator accepted the message.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{LedgerConfig, MAX_DAYS};
use crate::db::Database;
use crate::email::{EmailMessage, EmailSender};
use crate::error::{Error, Result};
use crate::export::{format_brl, format_date_br};
use crate::models::Transaction;
use crate::window::{days_after, midnight};

/// Flagged, not yet sent, and due no later than `now + lookahead_days`.
/// Overdue entries keep surfacing until they are marked sent.
pub fn select_reminders(
    transactions: &[Transaction],
    now: DateTime<Utc>,
    lookahead_days: i64,
) -> Vec<Transaction> {
    let horizon = now
        .checked_add_signed(Duration::days(lookahead_days.clamp(0, MAX_DAYS)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    let mut selected: Vec<Transaction> = transactions
        .iter()
        .filter(|t| t.has_reminder && !t.reminder_sent && midnight(t.date) <= horizon)
        .cloned()
        .collect();
    selected.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
    selected
}

/// Entries dated after `today` and at most `days` ahead, soonest first
pub fn upcoming(transactions: &[Transaction], today: NaiveDate, days: i64) -> Vec<Transaction> {
    let last = days_after(today, days);
    let mut selected: Vec<Transaction> = transactions
        .iter()
        .filter(|t| t.date > today && t.date <= last)
        .cloned()
        .collect();
    selected.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
    selected
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// HTML body listing the reminders
pub fn render_digest(reminders: &[Transaction]) -> String {
    let mut rows = String::new();
    for tx in reminders {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td style=\"text-align:right\">{}</td></tr>",
            format_date_br(tx.date),
            escape_html(&tx.description),
            escape_html(&tx.category),
            tx.kind.label(),
            format_brl(tx.amount),
        ));
    }

    format!(
        "<h2>Lembretes de transações</h2>\
         <p>Você tem {} transação(ões) próximas do vencimento:</p>\
         <table><thead><tr><th>Data</th><th>Descrição</th><th>Categoria</th><th>Tipo</th><th>Valor</th></tr></thead>\
         <tbody>{}</tbody></table>",
        reminders.len(),
        rows
    )
}

/// Result of a reminder dispatch
#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchReport {
    /// Provider message id; None when there was nothing to send
    pub email_id: Option<String>,
    /// Transactions included in the digest and now marked sent
    pub reminded: Vec<i64>,
}

/// Minimal shape check for a recipient address
pub fn validate_recipient(recipient: &str) -> Result<()> {
    let recipient = recipient.trim();
    match recipient.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(Error::InvalidInput(format!(
            "Invalid recipient email: {}",
            recipient
        ))),
    }
}

/// Sends pending reminders for one owner and records the delivery
pub struct ReminderDispatcher<'a, S: EmailSender + ?Sized> {
    db: &'a Database,
    sender: &'a S,
    config: &'a LedgerConfig,
}

impl<'a, S: EmailSender + ?Sized> ReminderDispatcher<'a, S> {
    pub fn new(db: &'a Database, sender: &'a S, config: &'a LedgerConfig) -> Self {
        Self { db, sender, config }
    }

    pub async fn dispatch(
        &self,
        owner: &str,
        recipient: &str,
        now: DateTime<Utc>,
    ) -> Result<DispatchReport> {
        validate_recipient(recipient)?;

        let candidates = self.db.pending_reminders(owner, now, self.config)?;
        if candidates.is_empty() {
            return Ok(DispatchReport::default());
        }

        let message = EmailMessage {
            from: self.config.sender_email.clone(),
            to: vec![recipient.trim().to_string()],
            subject: format!("Fluxo: {} lembrete(s) pendente(s)", candidates.len()),
            html: render_digest(&candidates),
        };

        let email_id = match self.sender.send(&message).await {
            Ok(id) => id,
            Err(e) => {
                warn!(owner = %owner, sender = self.sender.name(), error = %e, "Reminder email failed");
                return Err(match e {
                    Error::DependencyFailure(_) => e,
                    other => Error::DependencyFailure(other.to_string()),
                });
            }
        };

        let ids: Vec<i64> = candidates.iter().map(|t| t.id).collect();
        self.db.mark_reminders_sent(owner, &ids)?;
        info!(owner = %owner, email_id = %email_id, count = ids.len(), "Reminders sent");

        Ok(DispatchReport {
            email_id: Some(email_id),
            reminded: ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::tests::tx;
    use crate::models::TransactionKind;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap()
    }

    fn flagged(id: i64, date: (i32, u32, u32), sent: bool) -> Transaction {
        let mut t = tx(id, 50.0, TransactionKind::Expense, "Bills", date);
        t.has_reminder = true;
        t.reminder_sent = sent;
        t
    }

    #[test]
    fn test_tomorrow_selected_unless_sent() {
        let pending = flagged(1, (2024, 3, 16), false);
        let sent = flagged(2, (2024, 3, 16), true);
        let selected = select_reminders(&[pending, sent], now(), 1);
        let ids: Vec<i64> = selected.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn test_overdue_still_selected_and_far_future_not() {
        let overdue = flagged(1, (2024, 2, 1), false);
        let later = flagged(2, (2024, 3, 17), false);
        let unflagged = tx(3, 10.0, TransactionKind::Expense, "Bills", (2024, 3, 15));
        let selected = select_reminders(&[later, overdue, unflagged], now(), 1);
        let ids: Vec<i64> = selected.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn test_lookahead_widens_horizon() {
        let later = flagged(2, (2024, 3, 17), false);
        assert_eq!(select_reminders(&[later], now(), 2).len(), 1);
    }

    #[test]
    fn test_oversized_horizons_do_not_overflow() {
        let far = flagged(1, (2030, 1, 1), false);
        assert_eq!(select_reminders(&[far.clone()], now(), i64::MAX).len(), 1);
        assert!(select_reminders(&[far.clone()], now(), i64::MIN).is_empty());
        assert_eq!(upcoming(&[far], now().date_naive(), i64::MAX).len(), 1);
    }

    #[test]
    fn test_upcoming_excludes_today_includes_horizon() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let ledger = vec![
            tx(1, 1.0, TransactionKind::Expense, "A", (2024, 3, 15)),
            tx(2, 1.0, TransactionKind::Expense, "A", (2024, 3, 18)),
            tx(3, 1.0, TransactionKind::Income, "A", (2024, 3, 16)),
            tx(4, 1.0, TransactionKind::Expense, "A", (2024, 3, 19)),
        ];
        let ids: Vec<i64> = upcoming(&ledger, today, 3).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn test_render_digest_escapes() {
        let mut t = flagged(1, (2024, 3, 16), false);
        t.description = "<b>Luz</b> & água".into();
        let html = render_digest(&[t]);
        assert!(html.contains("&lt;b&gt;Luz&lt;/b&gt; &amp; água"));
        assert!(html.contains("16/03/2024"));
        assert!(html.contains("R$ 50,00"));
    }

    #[test]
    fn test_validate_recipient() {
        assert!(validate_recipient("ana@example.com").is_ok());
        assert!(validate_recipient("ana@localhost").is_err());
        assert!(validate_recipient("@example.com").is_err());
        assert!(validate_recipient("nobody").is_err());
    }
}
