//! Person entity (usuarios_sos row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the usuarios_sos table.
#[derive(Debug, Clone, FromRow)]
pub struct PersonEntity {
    pub id: i32,
    pub nombre: String,
    pub apellido: Option<String>,
    pub celular: String,
    pub disponible_red: bool,
    pub fcm_token: Option<String>,
    pub bloqueado: bool,
    pub motivo_bloqueo: Option<String>,
    pub fecha_bloqueo: Option<DateTime<Utc>>,
    pub fecha_registro: DateTime<Utc>,
}

impl From<PersonEntity> for domain::models::Person {
    fn from(entity: PersonEntity) -> Self {
        Self {
            id: entity.id,
            nombre: entity.nombre,
            apellido: entity.apellido,
            celular: entity.celular,
            disponible_red: entity.disponible_red,
            bloqueado: entity.bloqueado,
            motivo_bloqueo: entity.motivo_bloqueo,
            fecha_bloqueo: entity.fecha_bloqueo,
            fecha_registro: entity.fecha_registro,
        }
    }
}
