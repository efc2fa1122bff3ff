//! Per-recipient delivery records.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of one delivery attempt, as persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Enviado,
    Fallido,
}

impl DeliveryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryStatus::Enviado => "enviado",
            DeliveryStatus::Fallido => "fallido",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "enviado" => DeliveryStatus::Enviado,
            _ => DeliveryStatus::Fallido,
        }
    }
}

/// One row per (alert, recipient) pair, written exactly once by the
/// dispatcher and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRecord {
    pub id: i64,
    pub alerta_id: i64,
    pub celular_destinatario: String,
    pub nombre_destinatario: String,
    pub token: String,
    pub mensaje: String,
    pub estado_envio: DeliveryStatus,
    pub rol_destinatario: String,
    pub entidad: Option<String>,
    pub fecha: DateTime<Utc>,
}

/// Aggregated delivery counts for one alert.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliverySummary {
    pub total: i64,
    pub enviadas: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        assert_eq!(DeliveryStatus::parse("enviado"), DeliveryStatus::Enviado);
        assert_eq!(DeliveryStatus::parse("fallido"), DeliveryStatus::Fallido);
        // Anything unexpected reads back as a failure, never a phantom success.
        assert_eq!(DeliveryStatus::parse("pendiente"), DeliveryStatus::Fallido);
    }

    #[test]
    fn test_summary_default_is_zero() {
        let s = DeliverySummary::default();
        assert_eq!(s.total, 0);
        assert_eq!(s.enviadas, 0);
    }
}
