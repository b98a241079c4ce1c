//! Report handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;

use crate::{AppError, AppState, Owner};
use fluxo_core::models::{CategoryStats, PeriodComparison, PeriodStats, Transaction};
use fluxo_core::window::Period;

/// GET /api/stats/:period - Totals for the current week, month or year
pub async fn get_period_stats(
    State(state): State<Arc<AppState>>,
    Extension(Owner(owner)): Extension<Owner>,
    Path(period): Path<String>,
) -> Result<Json<PeriodStats>, AppError> {
    let period: Period = period.parse()?;
    let stats = state
        .db
        .period_stats(&owner, period, Utc::now(), &state.ledger)?;
    Ok(Json(stats))
}

/// GET /api/stats/comparison - Current month against the previous one
pub async fn get_comparison(
    State(state): State<Arc<AppState>>,
    Extension(Owner(owner)): Extension<Owner>,
) -> Result<Json<PeriodComparison>, AppError> {
    let comparison = state
        .db
        .month_comparison(&owner, Utc::now(), &state.ledger)?;
    Ok(Json(comparison))
}

/// GET /api/categories/stats - Current-month expense by category
pub async fn get_category_stats(
    State(state): State<Arc<AppState>>,
    Extension(Owner(owner)): Extension<Owner>,
) -> Result<Json<Vec<CategoryStats>>, AppError> {
    let stats = state
        .db
        .category_stats(&owner, Utc::now(), &state.ledger)?;
    Ok(Json(stats))
}

/// GET /api/alerts/upcoming - Entries due in the next few days
pub async fn list_upcoming(
    State(state): State<Arc<AppState>>,
    Extension(Owner(owner)): Extension<Owner>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let upcoming = state
        .db
        .upcoming_transactions(&owner, Utc::now().date_naive(), &state.ledger)?;
    Ok(Json(upcoming))
}
