//! Responder declarations for an alert.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Action a responder declares when acknowledging an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponderAction {
    EnCamino,
    LlamoAutoridades,
    GrabandoEvidencia,
    Observando,
}

impl ResponderAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponderAction::EnCamino => "en_camino",
            ResponderAction::LlamoAutoridades => "llamo_autoridades",
            ResponderAction::GrabandoEvidencia => "grabando_evidencia",
            ResponderAction::Observando => "observando",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "llamo_autoridades" => ResponderAction::LlamoAutoridades,
            "grabando_evidencia" => ResponderAction::GrabandoEvidencia,
            "observando" => ResponderAction::Observando,
            _ => ResponderAction::EnCamino,
        }
    }

    /// Human phrasing used in the push sent back to the alert source.
    pub fn describe(self) -> &'static str {
        match self {
            ResponderAction::EnCamino => "va en camino",
            ResponderAction::LlamoAutoridades => "llamó a las autoridades",
            ResponderAction::GrabandoEvidencia => "está grabando evidencia",
            ResponderAction::Observando => "está observando la situación",
        }
    }
}

impl Default for ResponderAction {
    fn default() -> Self {
        ResponderAction::EnCamino
    }
}

/// One response per (alert, responder) pair.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertResponse {
    pub id: i64,
    pub alerta_id: i64,
    pub id_persona: i32,
    pub celular: String,
    pub nombre: String,
    pub entidad: Option<String>,
    pub accion: ResponderAction,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
    pub tiempo_estimado_min: Option<i32>,
    pub fecha_respuesta: DateTime<Utc>,
}

/// Request payload for responding to an alert.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RespondRequest {
    pub alerta_id: i64,

    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub celular: String,

    pub id_persona: i32,

    #[serde(default)]
    pub accion: ResponderAction,

    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub latitud: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub longitud: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_eta_minutes"))]
    pub tiempo_estimado_min: Option<i32>,
}

/// Acknowledgement returned to a responder.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondResponse {
    pub success: bool,
    pub nombre: String,
    pub entidad: Option<String>,
    pub accion: ResponderAction,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_action_roundtrip() {
        for action in [
            ResponderAction::EnCamino,
            ResponderAction::LlamoAutoridades,
            ResponderAction::GrabandoEvidencia,
            ResponderAction::Observando,
        ] {
            assert_eq!(ResponderAction::parse(action.as_str()), action);
        }
    }

    #[test]
    fn test_unknown_action_defaults_to_en_camino() {
        assert_eq!(ResponderAction::parse("teleport"), ResponderAction::EnCamino);
    }

    #[test]
    fn test_respond_request_validation() {
        let req = RespondRequest {
            alerta_id: 10,
            celular: "3001234567".into(),
            id_persona: 4,
            accion: ResponderAction::EnCamino,
            latitud: Some(4.7),
            longitud: Some(-74.0),
            tiempo_estimado_min: Some(8),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_respond_request_negative_eta_rejected() {
        let req = RespondRequest {
            alerta_id: 10,
            celular: "3001234567".into(),
            id_persona: 4,
            accion: ResponderAction::EnCamino,
            latitud: None,
            longitud: None,
            tiempo_estimado_min: Some(-3),
        };
        assert!(req.validate().is_err());
    }
}
