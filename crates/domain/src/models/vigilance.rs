//! Preventive vigilance reports and their confirmation quorum.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Independent confirmations required before a vigilance escalates into a
/// full alert.
pub const CONFIRMATION_QUORUM: i32 = 2;

/// Lifecycle state of a vigilance. Escalation is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VigilanceState {
    Activa,
    Escalada,
    Cerrada,
}

impl VigilanceState {
    pub fn as_str(self) -> &'static str {
        match self {
            VigilanceState::Activa => "activa",
            VigilanceState::Escalada => "escalada",
            VigilanceState::Cerrada => "cerrada",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "escalada" => VigilanceState::Escalada,
            "cerrada" => VigilanceState::Cerrada,
            _ => VigilanceState::Activa,
        }
    }
}

/// A preventive report of suspicious activity awaiting witness quorum.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vigilance {
    pub id: i64,
    pub celular: String,
    pub nombre: Option<String>,
    pub descripcion: String,
    pub tipo_sospecha: String,
    pub latitud: f64,
    pub longitud: f64,
    pub estado: VigilanceState,
    pub confirmaciones: i32,
    pub rechazos: i32,
    pub alerta_id: Option<i64>,
    pub fecha: DateTime<Utc>,
}

/// Request payload for submitting a vigilance report.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVigilanceRequest {
    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub celular: String,

    pub nombre: Option<String>,

    #[validate(length(min = 5, max = 2000, message = "Description must be 5-2000 characters"))]
    pub descripcion: String,

    #[serde(default = "default_tipo_sospecha")]
    pub tipo_sospecha: String,

    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub latitud: f64,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub longitud: f64,
}

fn default_tipo_sospecha() -> String {
    "general".to_string()
}

/// Request payload for confirming or rejecting a vigilance.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmVigilanceRequest {
    pub vigilancia_id: i64,

    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub celular: String,

    pub confirma: bool,

    pub comentario: Option<String>,

    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub latitud: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub longitud: Option<f64>,
}

/// Quorum state returned after a confirmation is recorded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmVigilanceResponse {
    pub success: bool,
    pub confirmaciones: i32,
    pub rechazos: i32,
    pub escalada: bool,
    pub alerta_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_state_roundtrip() {
        for state in [
            VigilanceState::Activa,
            VigilanceState::Escalada,
            VigilanceState::Cerrada,
        ] {
            assert_eq!(VigilanceState::parse(state.as_str()), state);
        }
    }

    #[test]
    fn test_unknown_state_reads_as_active() {
        assert_eq!(VigilanceState::parse("pendiente"), VigilanceState::Activa);
    }

    #[test]
    fn test_create_request_requires_description() {
        let req = CreateVigilanceRequest {
            celular: "3001234567".into(),
            nombre: None,
            descripcion: "ok".into(),
            tipo_sospecha: "general".into(),
            latitud: 4.711,
            longitud: -74.072,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_request_valid() {
        let req = CreateVigilanceRequest {
            celular: "3001234567".into(),
            nombre: Some("Ana".into()),
            descripcion: "Persona merodeando el parque".into(),
            tipo_sospecha: "merodeo".into(),
            latitud: 4.711,
            longitud: -74.072,
        };
        assert!(req.validate().is_ok());
    }
}
