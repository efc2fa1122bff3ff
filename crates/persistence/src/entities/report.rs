//! User report entity (reportes_usuario row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use domain::models::Report;

/// Database row mapping for the reportes_usuario table.
#[derive(Debug, Clone, FromRow)]
pub struct ReportEntity {
    pub id: i64,
    pub celular_reportado: String,
    pub celular_reporta: String,
    pub motivo: String,
    pub descripcion: Option<String>,
    pub fecha: DateTime<Utc>,
}

impl From<ReportEntity> for Report {
    fn from(entity: ReportEntity) -> Self {
        Self {
            id: entity.id,
            celular_reportado: entity.celular_reportado,
            celular_reporta: entity.celular_reporta,
            motivo: entity.motivo,
            descripcion: entity.descripcion,
            fecha: entity.fecha,
        }
    }
}
