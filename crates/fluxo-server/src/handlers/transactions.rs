//! Transaction handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::parse_date_param;
use crate::{AppError, AppState, Owner, SuccessResponse, MAX_PAGE_LIMIT};
use fluxo_core::db::TransactionFilter;
use fluxo_core::models::{
    NewTransaction, RecurrenceRule, RecurringDefinition, Transaction, TransactionKind,
    TransactionUpdate,
};

/// Query parameters for listing transactions
#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub category: Option<String>,
    /// income or expense
    pub kind: Option<String>,
    /// Search query (description or category)
    pub search: Option<String>,
    /// Custom start date (YYYY-MM-DD)
    pub from: Option<String>,
    /// Custom end date (YYYY-MM-DD)
    pub to: Option<String>,
    /// Sort field (date or amount)
    pub sort: Option<String>,
    /// Sort direction (asc or desc)
    pub order: Option<String>,
}

fn default_limit() -> i64 {
    100
}

#[derive(Serialize)]
pub struct TransactionResponse {
    pub transactions: Vec<Transaction>,
    pub total: i64,
    pub limit: i64,
}

/// GET /api/transactions - List transactions
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Extension(Owner(owner)): Extension<Owner>,
    Query(params): Query<TransactionQuery>,
) -> Result<Json<TransactionResponse>, AppError> {
    // Input validation: clamp pagination parameters
    let limit = params.limit.clamp(1, MAX_PAGE_LIMIT);

    let kind = params
        .kind
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<TransactionKind>)
        .transpose()?;
    let from = parse_date_param("from", params.from.as_deref())?;
    let to = parse_date_param("to", params.to.as_deref())?;

    let filter = || {
        TransactionFilter::new(&owner)
            .category(params.category.as_deref())
            .kind(kind)
            .search(params.search.as_deref())
            .since(from)
            .until(to)
            .sort_field(params.sort.as_deref())
            .sort_order(params.order.as_deref())
    };

    let transactions = state.db.search_transactions(filter(), limit)?;
    let total = state.db.count_transactions(filter())?;

    Ok(Json(TransactionResponse {
        transactions,
        total,
        limit,
    }))
}

/// Request body for creating a transaction, optionally recurring
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    #[serde(flatten)]
    pub transaction: NewTransaction,
    /// When present, a recurring definition starting at the transaction's date is created
    #[serde(default)]
    pub recurring: Option<RecurrenceRule>,
}

#[derive(Serialize)]
pub struct CreateTransactionResponse {
    pub transaction: Transaction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring: Option<RecurringDefinition>,
}

/// POST /api/transactions - Create a transaction
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Extension(Owner(owner)): Extension<Owner>,
    Json(req): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<CreateTransactionResponse>), AppError> {
    let response = match req.recurring {
        Some(rule) => {
            let (definition, transaction) = state.db.create_recurring(
                &owner,
                &req.transaction,
                &rule,
                &state.ledger.recurring_suffix,
            )?;
            CreateTransactionResponse {
                transaction,
                recurring: Some(definition),
            }
        }
        None => {
            let id = state.db.insert_transaction(&owner, &req.transaction)?;
            info!(transaction_id = id, owner = %owner, "Transaction created");
            CreateTransactionResponse {
                transaction: state.db.get_transaction(&owner, id)?,
                recurring: None,
            }
        }
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/transactions/:id - Get one transaction
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Extension(Owner(owner)): Extension<Owner>,
    Path(id): Path<i64>,
) -> Result<Json<Transaction>, AppError> {
    Ok(Json(state.db.get_transaction(&owner, id)?))
}

/// PUT /api/transactions/:id - Partial update
pub async fn update_transaction(
    State(state): State<Arc<AppState>>,
    Extension(Owner(owner)): Extension<Owner>,
    Path(id): Path<i64>,
    Json(update): Json<TransactionUpdate>,
) -> Result<Json<Transaction>, AppError> {
    let transaction = state.db.update_transaction(&owner, id, &update)?;
    Ok(Json(transaction))
}

/// DELETE /api/transactions/:id - Delete one transaction
pub async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    Extension(Owner(owner)): Extension<Owner>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    if state.db.delete_transaction(&owner, id)? == 0 {
        return Err(AppError::not_found("Transaction not found"));
    }
    info!(transaction_id = id, owner = %owner, "Transaction deleted");
    Ok(Json(SuccessResponse { success: true }))
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<i64>,
}

#[derive(Serialize)]
pub struct BulkDeleteResponse {
    pub deleted: usize,
}

/// DELETE /api/transactions - Delete several transactions
pub async fn bulk_delete_transactions(
    State(state): State<Arc<AppState>>,
    Extension(Owner(owner)): Extension<Owner>,
    Json(req): Json<BulkDeleteRequest>,
) -> Result<Json<BulkDeleteResponse>, AppError> {
    if req.ids.len() as i64 > MAX_PAGE_LIMIT {
        return Err(AppError::bad_request("Too many ids in one request"));
    }
    let deleted = state.db.delete_transactions(&owner, &req.ids)?;
    info!(owner = %owner, requested = req.ids.len(), deleted, "Bulk delete");
    Ok(Json(BulkDeleteResponse { deleted }))
}

/// GET /api/categories - Category labels in use
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    Extension(Owner(owner)): Extension<Owner>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.db.list_categories(&owner)?))
}
