//! Template handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use crate::{AppError, AppState, Owner, SuccessResponse};
use fluxo_core::models::{NewTemplate, Template};

/// GET /api/templates - List templates
pub async fn list_templates(
    State(state): State<Arc<AppState>>,
    Extension(Owner(owner)): Extension<Owner>,
) -> Result<Json<Vec<Template>>, AppError> {
    Ok(Json(state.db.list_templates(&owner)?))
}

/// POST /api/templates - Save a template
pub async fn create_template(
    State(state): State<Arc<AppState>>,
    Extension(Owner(owner)): Extension<Owner>,
    Json(req): Json<NewTemplate>,
) -> Result<(StatusCode, Json<Template>), AppError> {
    let template = state.db.insert_template(&owner, &req)?;
    Ok((StatusCode::CREATED, Json(template)))
}

/// DELETE /api/templates/:id - Delete a template
pub async fn delete_template(
    State(state): State<Arc<AppState>>,
    Extension(Owner(owner)): Extension<Owner>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    if state.db.delete_template(&owner, id)? == 0 {
        return Err(AppError::not_found("Template not found"));
    }
    Ok(Json(SuccessResponse { success: true }))
}
