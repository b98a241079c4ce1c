//! Budget handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use tracing::info;

use crate::{AppError, AppState, Owner, SuccessResponse};
use fluxo_core::models::{Budget, NewBudget};

/// GET /api/budgets - List budgets
pub async fn list_budgets(
    State(state): State<Arc<AppState>>,
    Extension(Owner(owner)): Extension<Owner>,
) -> Result<Json<Vec<Budget>>, AppError> {
    Ok(Json(state.db.list_budgets(&owner)?))
}

/// POST /api/budgets - Create a budget
pub async fn create_budget(
    State(state): State<Arc<AppState>>,
    Extension(Owner(owner)): Extension<Owner>,
    Json(req): Json<NewBudget>,
) -> Result<(StatusCode, Json<Budget>), AppError> {
    let budget = state.db.upsert_budget(&owner, &req)?;
    info!(budget_id = budget.id, owner = %owner, category = %budget.category, "Budget created");
    Ok((StatusCode::CREATED, Json(budget)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateBudgetRequest {
    pub limit: f64,
}

/// PUT /api/budgets/:id - Change a budget's limit
pub async fn update_budget(
    State(state): State<Arc<AppState>>,
    Extension(Owner(owner)): Extension<Owner>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateBudgetRequest>,
) -> Result<Json<Budget>, AppError> {
    Ok(Json(state.db.update_budget_limit(&owner, id, req.limit)?))
}

/// DELETE /api/budgets/:id - Delete a budget
pub async fn delete_budget(
    State(state): State<Arc<AppState>>,
    Extension(Owner(owner)): Extension<Owner>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    if state.db.delete_budget(&owner, id)? == 0 {
        return Err(AppError::not_found("Budget not found"));
    }
    Ok(Json(SuccessResponse { success: true }))
}
