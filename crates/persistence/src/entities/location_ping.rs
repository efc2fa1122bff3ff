//! Community location ping entity (ubicaciones_red row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use domain::models::LocationPing;

/// Database row mapping for the ubicaciones_red table.
#[derive(Debug, Clone, FromRow)]
pub struct LocationPingEntity {
    pub id: i64,
    pub celular: String,
    pub id_persona: Option<i32>,
    pub nombre: Option<String>,
    pub latitud: f64,
    pub longitud: f64,
    pub disponible: bool,
    pub actualizado_at: DateTime<Utc>,
}

impl From<LocationPingEntity> for LocationPing {
    fn from(entity: LocationPingEntity) -> Self {
        Self {
            celular: entity.celular,
            id_persona: entity.id_persona,
            nombre: entity.nombre,
            latitud: entity.latitud,
            longitud: entity.longitud,
            disponible: entity.disponible,
            actualizado_at: entity.actualizado_at,
        }
    }
}
