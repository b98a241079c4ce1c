//! Export handlers

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, Response, StatusCode},
    Extension,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use super::parse_date_param;
use crate::{AppError, AppState, Owner, MAX_PAGE_LIMIT};
use fluxo_core::db::TransactionFilter;
use fluxo_core::models::TransactionKind;

/// Query parameters for transaction export
#[derive(Debug, Deserialize)]
pub struct TransactionExportQuery {
    /// Start date (YYYY-MM-DD)
    pub from: Option<String>,
    /// End date (YYYY-MM-DD)
    pub to: Option<String>,
    pub category: Option<String>,
    pub kind: Option<String>,
}

/// GET /api/export/transactions - Export transactions to CSV
pub async fn export_transactions(
    State(state): State<Arc<AppState>>,
    Extension(Owner(owner)): Extension<Owner>,
    Query(params): Query<TransactionExportQuery>,
) -> Result<Response<Body>, AppError> {
    let from = parse_date_param("from", params.from.as_deref())?;
    let to = parse_date_param("to", params.to.as_deref())?;
    let kind = params
        .kind
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<TransactionKind>)
        .transpose()?;

    let filter = TransactionFilter::new(&owner)
        .category(params.category.as_deref())
        .kind(kind)
        .since(from)
        .until(to);

    let limit = state.ledger.fetch_limit.max(MAX_PAGE_LIMIT);
    let csv = state.db.export_transactions_csv(filter, limit)?;

    info!(owner = %owner, from = ?from, to = ?to, "Exported transactions");

    let filename = format!("transacoes_{}.csv", Utc::now().format("%Y-%m-%d"));
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )
        .body(Body::from(csv))
        .map_err(|e| AppError::internal(&format!("Failed to build response: {}", e)))
}
