//! Reminder handlers

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{AppError, AppState, Owner};
use fluxo_core::email::{EmailClient, EmailMessage, EmailSender};
use fluxo_core::models::Transaction;
use fluxo_core::reminders::{validate_recipient, DispatchReport, ReminderDispatcher};

fn email_client(state: &AppState) -> Result<&EmailClient, AppError> {
    state
        .email
        .as_ref()
        .ok_or_else(|| AppError::bad_gateway("Email delivery is not configured"))
}

/// GET /api/reminders - Reminder candidates due soon
pub async fn list_reminders(
    State(state): State<Arc<AppState>>,
    Extension(Owner(owner)): Extension<Owner>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let reminders = state
        .db
        .pending_reminders(&owner, Utc::now(), &state.ledger)?;
    Ok(Json(reminders))
}

#[derive(Debug, Deserialize)]
pub struct SendRemindersRequest {
    pub recipient_email: String,
}

/// POST /api/reminders/send - Email the pending reminders and mark them sent
pub async fn send_reminders(
    State(state): State<Arc<AppState>>,
    Extension(Owner(owner)): Extension<Owner>,
    Json(req): Json<SendRemindersRequest>,
) -> Result<Json<DispatchReport>, AppError> {
    let sender = email_client(&state)?;
    let dispatcher = ReminderDispatcher::new(&state.db, sender, &state.ledger);
    let report = dispatcher
        .dispatch(&owner, &req.recipient_email, Utc::now())
        .await?;
    Ok(Json(report))
}

/// Free-form email, as submitted by the front end
#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub recipient_email: String,
    pub subject: String,
    pub html_content: String,
}

#[derive(Serialize)]
pub struct EmailResponse {
    pub status: String,
    pub message: String,
    pub email_id: String,
}

/// POST /api/send-reminder - Send one email through the configured provider
pub async fn send_reminder_email(
    State(state): State<Arc<AppState>>,
    Extension(Owner(owner)): Extension<Owner>,
    Json(req): Json<EmailRequest>,
) -> Result<Json<EmailResponse>, AppError> {
    validate_recipient(&req.recipient_email)?;
    let sender = email_client(&state)?;

    let message = EmailMessage {
        from: state.ledger.sender_email.clone(),
        to: vec![req.recipient_email.trim().to_string()],
        subject: req.subject,
        html: req.html_content,
    };

    let email_id = sender.send(&message).await.map_err(|e| {
        error!(owner = %owner, error = %e, "Failed to send email");
        AppError::bad_gateway("Falha ao enviar e-mail")
    })?;

    info!(owner = %owner, email_id = %email_id, "Email sent");
    Ok(Json(EmailResponse {
        status: "success".to_string(),
        message: format!("Lembrete enviado para {}", req.recipient_email.trim()),
        email_id,
    }))
}
