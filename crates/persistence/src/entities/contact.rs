//! Trusted contact entity (contactos_confianza row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the contactos_confianza table.
#[derive(Debug, Clone, FromRow)]
pub struct ContactEntity {
    pub id: i32,
    pub usuario_id: i32,
    pub nombre: String,
    pub celular: String,
    pub parentesco: Option<String>,
    pub disponible_emergencias: bool,
    pub activo: bool,
    pub fecha_registro: DateTime<Utc>,
}
