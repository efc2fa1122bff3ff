//! Alert endpoints: submission, classification, responses and lookups.

use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use domain::models::{
    AlertResponse, RespondRequest, RespondResponse, SubmitAlertRequest, SubmitAlertResponse,
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::alert_engine::AlertDetail;
use crate::services::classifier::{Classification, ClassifyRequest};

/// POST /api/v1/alertas
pub async fn submit_alert(
    State(state): State<AppState>,
    Json(req): Json<SubmitAlertRequest>,
) -> Result<Json<SubmitAlertResponse>, ApiError> {
    req.validate()?;
    let ack = state.alert_engine.submit(req).await?;
    Ok(Json(ack))
}

/// POST /api/v1/alertas/clasificar
pub async fn classify_alert(
    State(state): State<AppState>,
    Json(req): Json<ClassifyRequest>,
) -> Result<Json<Classification>, ApiError> {
    req.validate()?;
    let classifier = state
        .classifier
        .as_ref()
        .ok_or_else(|| ApiError::ServiceUnavailable("Clasificador no configurado".to_string()))?;
    let classification = classifier.classify(req).await?;
    Ok(Json(classification))
}

/// POST /api/v1/alertas/responder
pub async fn respond_to_alert(
    State(state): State<AppState>,
    Json(req): Json<RespondRequest>,
) -> Result<Json<RespondResponse>, ApiError> {
    req.validate()?;
    let ack = state.alert_engine.respond(req).await?;
    Ok(Json(ack))
}

/// GET /api/v1/alertas/:id
pub async fn get_alert(
    State(state): State<AppState>,
    Path(alerta_id): Path<i64>,
) -> Result<Json<AlertDetail>, ApiError> {
    let detail = state.alert_engine.detail(alerta_id).await?;
    Ok(Json(detail))
}

/// GET /api/v1/alertas/:id/respuestas
pub async fn get_alert_responses(
    State(state): State<AppState>,
    Path(alerta_id): Path<i64>,
) -> Result<Json<Vec<AlertResponse>>, ApiError> {
    let responses = state.alert_engine.list_responses(alerta_id).await?;
    Ok(Json(responses))
}
