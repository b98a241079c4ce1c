//! Tip generation handler

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use tracing::debug;

use crate::{AppError, AppState, Owner};
use fluxo_core::tips::TipsResponse;
use fluxo_core::window::Period;

#[derive(Debug, Deserialize)]
pub struct TipsRequest {
    pub period: Period,
}

/// POST /api/tips - Financial tips for a period
///
/// Never fails because of the text generator: without one (or when it
/// errors) the response carries the fallback message and the stats.
pub async fn generate_tips(
    State(state): State<Arc<AppState>>,
    Extension(Owner(owner)): Extension<Owner>,
    Json(req): Json<TipsRequest>,
) -> Result<Json<TipsResponse>, AppError> {
    let stats = state
        .db
        .period_stats(&owner, req.period, Utc::now(), &state.ledger)?;

    let response = match &state.ai {
        Some(ai) => fluxo_core::generate_tips(ai, req.period, stats, &state.ledger).await,
        None => {
            debug!("No text generator configured, returning fallback tips");
            TipsResponse::fallback(stats, &state.ledger)
        }
    };

    Ok(Json(response))
}
