//! Authorized caregiver entity (cuidadores_autorizados row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the cuidadores_autorizados table.
#[derive(Debug, Clone, FromRow)]
pub struct CaregiverEntity {
    pub id: i32,
    pub celular_cuidado: String,
    pub celular_cuidador: String,
    pub id_persona_cuidador: Option<i32>,
    pub nombre_cuidador: Option<String>,
    pub activo: bool,
    pub fecha_registro: DateTime<Utc>,
}
