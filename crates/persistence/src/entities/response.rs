//! Alert response entity (respuestas_institucionales row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use domain::models::{AlertResponse, ResponderAction};

/// Database row mapping for the respuestas_institucionales table.
#[derive(Debug, Clone, FromRow)]
pub struct ResponseEntity {
    pub id: i64,
    pub alerta_id: i64,
    pub id_persona: i32,
    pub celular: String,
    pub nombre: String,
    pub entidad: Option<String>,
    pub accion: String,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
    pub tiempo_estimado_min: Option<i32>,
    pub fecha_respuesta: DateTime<Utc>,
}

impl From<ResponseEntity> for AlertResponse {
    fn from(entity: ResponseEntity) -> Self {
        Self {
            id: entity.id,
            alerta_id: entity.alerta_id,
            id_persona: entity.id_persona,
            celular: entity.celular,
            nombre: entity.nombre,
            entidad: entity.entidad,
            accion: ResponderAction::parse(&entity.accion),
            latitud: entity.latitud,
            longitud: entity.longitud,
            tiempo_estimado_min: entity.tiempo_estimado_min,
            fecha_respuesta: entity.fecha_respuesta,
        }
    }
}
