//! Community network endpoints.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use domain::models::location_ping::UpsertPingRequest;
use domain::models::LocationPing;
use persistence::repositories::{LocationPingRepository, PersonRepository, PushTokenRepository};
use shared::phone::PhoneKey;

use crate::app::AppState;
use crate::error::ApiError;

/// POST /api/v1/red/ubicacion
///
/// Upserts the caller's last known location for community-circle
/// resolution. One row per phone.
pub async fn upsert_location(
    State(state): State<AppState>,
    Json(req): Json<UpsertPingRequest>,
) -> Result<Json<LocationPing>, ApiError> {
    req.validate()?;
    let phone = PhoneKey::parse(&req.celular)?;

    let persons = PersonRepository::new(state.pool.clone());
    let person = persons.find_by_phone(&phone).await?;

    // A blocked account cannot rejoin the network by pinging.
    let disponible = match &person {
        Some(p) if p.bloqueado => false,
        _ => req.disponible,
    };

    let nombre = req
        .nombre
        .clone()
        .or_else(|| person.as_ref().map(|p| p.nombre.clone()));

    let pings = LocationPingRepository::new(state.pool.clone());
    let entity = pings
        .upsert(
            &phone,
            person.as_ref().map(|p| p.id),
            nombre.as_deref(),
            req.latitud,
            req.longitud,
            disponible,
        )
        .await?;

    Ok(Json(LocationPing::from(entity)))
}

/// Request payload for registering a device push token.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTokenRequest {
    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub celular: String,

    #[validate(length(min = 20, message = "token demasiado corto"))]
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTokenResponse {
    pub success: bool,
}

/// POST /api/v1/red/token
///
/// Registers the device's current push token, rotating out earlier ones
/// so at most one valid token exists per phone.
pub async fn register_token(
    State(state): State<AppState>,
    Json(req): Json<RegisterTokenRequest>,
) -> Result<Json<RegisterTokenResponse>, ApiError> {
    req.validate()?;
    let phone = PhoneKey::parse(&req.celular)?;

    let persons = PersonRepository::new(state.pool.clone());
    let id_persona = persons.find_by_phone(&phone).await?.map(|p| p.id);

    let tokens = PushTokenRepository::new(state.pool.clone());
    tokens.register(&phone, id_persona, &req.token).await?;

    Ok(Json(RegisterTokenResponse { success: true }))
}
