//! Abuse reports against community participants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Distinct reports required before a person is blocked.
pub const BLOCK_THRESHOLD: i64 = 3;

/// One report per ordered (reported, reporter) pair.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: i64,
    pub celular_reportado: String,
    pub celular_reporta: String,
    pub motivo: String,
    pub descripcion: Option<String>,
    pub fecha: DateTime<Utc>,
}

/// Request payload for reporting a person.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReportPersonRequest {
    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub celular_reportado: String,

    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub celular_reporta: String,

    #[serde(default = "default_motivo")]
    pub motivo: String,

    pub descripcion: Option<String>,
}

fn default_motivo() -> String {
    "comportamiento".to_string()
}

/// Result of a report: how many reports the person now has and whether the
/// block threshold was reached.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPersonResponse {
    pub success: bool,
    pub total_reportes: i64,
    pub bloqueado: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_report_request_valid() {
        let req = ReportPersonRequest {
            celular_reportado: "3001234567".into(),
            celular_reporta: "3009876543".into(),
            motivo: "comportamiento".into(),
            descripcion: None,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_report_request_bad_phone_rejected() {
        let req = ReportPersonRequest {
            celular_reportado: "12".into(),
            celular_reporta: "3009876543".into(),
            motivo: "comportamiento".into(),
            descripcion: None,
        };
        assert!(req.validate().is_err());
    }
}
