//! Recurring definition handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::parse_date_param;
use crate::{AppError, AppState, Owner};
use fluxo_core::db::MaterializeResult;
use fluxo_core::models::{NewTransaction, RecurrenceRule, RecurringDefinition, Transaction};

/// GET /api/recurring - List definitions (active first)
pub async fn list_recurring(
    State(state): State<Arc<AppState>>,
    Extension(Owner(owner)): Extension<Owner>,
) -> Result<Json<Vec<RecurringDefinition>>, AppError> {
    Ok(Json(state.db.list_recurring(&owner)?))
}

/// A transaction plus its recurrence rule, in one flat body
#[derive(Debug, Deserialize)]
pub struct CreateRecurringRequest {
    #[serde(flatten)]
    pub transaction: NewTransaction,
    #[serde(flatten)]
    pub rule: RecurrenceRule,
}

#[derive(Serialize)]
pub struct CreateRecurringResponse {
    pub recurring: RecurringDefinition,
    /// The first occurrence, materialized on the start date
    pub transaction: Transaction,
}

/// POST /api/recurring - Create a definition and its first occurrence
pub async fn create_recurring(
    State(state): State<Arc<AppState>>,
    Extension(Owner(owner)): Extension<Owner>,
    Json(req): Json<CreateRecurringRequest>,
) -> Result<(StatusCode, Json<CreateRecurringResponse>), AppError> {
    let (recurring, transaction) = state.db.create_recurring(
        &owner,
        &req.transaction,
        &req.rule,
        &state.ledger.recurring_suffix,
    )?;
    Ok((
        StatusCode::CREATED,
        Json(CreateRecurringResponse {
            recurring,
            transaction,
        }),
    ))
}

/// GET /api/recurring/:id - Get one definition
pub async fn get_recurring(
    State(state): State<Arc<AppState>>,
    Extension(Owner(owner)): Extension<Owner>,
    Path(id): Path<i64>,
) -> Result<Json<RecurringDefinition>, AppError> {
    Ok(Json(state.db.get_recurring(&owner, id)?))
}

/// POST /api/recurring/:id/cancel - Stop future occurrences
pub async fn cancel_recurring(
    State(state): State<Arc<AppState>>,
    Extension(Owner(owner)): Extension<Owner>,
    Path(id): Path<i64>,
) -> Result<Json<RecurringDefinition>, AppError> {
    Ok(Json(state.db.deactivate_recurring(&owner, id)?))
}

#[derive(Debug, Deserialize)]
pub struct MaterializeQuery {
    /// Last date to materialize (YYYY-MM-DD); defaults to the sweep horizon
    pub through: Option<String>,
}

/// POST /api/recurring/:id/materialize - Fill in missing occurrences now
pub async fn materialize_recurring(
    State(state): State<Arc<AppState>>,
    Extension(Owner(owner)): Extension<Owner>,
    Path(id): Path<i64>,
    Query(params): Query<MaterializeQuery>,
) -> Result<Json<MaterializeResult>, AppError> {
    let limit = state.ledger.materialize_limit(Utc::now().date_naive());
    let through = match parse_date_param("through", params.through.as_deref())? {
        Some(date) if date > limit => {
            return Err(AppError::bad_request(&format!(
                "'through' may not be later than {}",
                limit
            )));
        }
        Some(date) => date,
        None => limit,
    };

    let definition = state.db.get_recurring(&owner, id)?;
    let result =
        state
            .db
            .materialize_recurring(&definition, through, &state.ledger.recurring_suffix)?;
    Ok(Json(result))
}
