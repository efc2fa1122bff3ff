//! Person report endpoint.

use axum::{extract::State, Json};
use validator::Validate;

use domain::models::report::{ReportPersonRequest, ReportPersonResponse};

use crate::app::AppState;
use crate::error::ApiError;

/// POST /api/v1/reportes
pub async fn report_person(
    State(state): State<AppState>,
    Json(req): Json<ReportPersonRequest>,
) -> Result<Json<ReportPersonResponse>, ApiError> {
    req.validate()?;
    let outcome = state.abuse_engine.report(req).await?;
    Ok(Json(outcome))
}
