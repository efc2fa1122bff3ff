//! Vigilance endpoints: creation and confirmation.

use axum::{extract::State, Json};
use validator::Validate;

use domain::models::vigilance::{
    ConfirmVigilanceRequest, ConfirmVigilanceResponse, CreateVigilanceRequest, Vigilance,
};

use crate::app::AppState;
use crate::error::ApiError;

/// POST /api/v1/vigilancias
pub async fn create_vigilance(
    State(state): State<AppState>,
    Json(req): Json<CreateVigilanceRequest>,
) -> Result<Json<Vigilance>, ApiError> {
    req.validate()?;
    let vigilance = state.vigilance_engine.create(req).await?;
    Ok(Json(vigilance))
}

/// POST /api/v1/vigilancias/confirmar
pub async fn confirm_vigilance(
    State(state): State<AppState>,
    Json(req): Json<ConfirmVigilanceRequest>,
) -> Result<Json<ConfirmVigilanceResponse>, ApiError> {
    req.validate()?;
    let outcome = state.vigilance_engine.confirm(req).await?;
    Ok(Json(outcome))
}
