//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod budgets;
pub mod export;
pub mod recurring;
pub mod reminders;
pub mod reports;
pub mod templates;
pub mod tips;
pub mod transactions;

// Re-export all handlers for use in router
pub use budgets::*;
pub use export::*;
pub use recurring::*;
pub use reminders::*;
pub use reports::*;
pub use templates::*;
pub use tips::*;
pub use transactions::*;

use axum::Json;
use chrono::NaiveDate;

use crate::AppError;

/// GET /api/ - Service banner
pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Meu Fluxo API" }))
}

/// Parse an optional `YYYY-MM-DD` query parameter
pub(crate) fn parse_date_param(
    name: &str,
    value: Option<&str>,
) -> Result<Option<NaiveDate>, AppError> {
    value
        .filter(|s| !s.is_empty())
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .map_err(|_| AppError::bad_request(&format!("Invalid '{}' date format (use YYYY-MM-DD)", name)))
}
