//! Vigilance entities (vigilancias and confirmaciones_vigilancia row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use domain::models::{Vigilance, VigilanceState};

/// Database row mapping for the vigilancias table.
#[derive(Debug, Clone, FromRow)]
pub struct VigilanceEntity {
    pub id: i64,
    pub celular: String,
    pub nombre: Option<String>,
    pub descripcion: String,
    pub tipo_sospecha: String,
    pub latitud: f64,
    pub longitud: f64,
    pub estado: String,
    pub confirmaciones: i32,
    pub rechazos: i32,
    pub alerta_id: Option<i64>,
    pub fecha: DateTime<Utc>,
}

impl From<VigilanceEntity> for Vigilance {
    fn from(entity: VigilanceEntity) -> Self {
        Self {
            id: entity.id,
            celular: entity.celular,
            nombre: entity.nombre,
            descripcion: entity.descripcion,
            tipo_sospecha: entity.tipo_sospecha,
            latitud: entity.latitud,
            longitud: entity.longitud,
            estado: VigilanceState::parse(&entity.estado),
            confirmaciones: entity.confirmaciones,
            rechazos: entity.rechazos,
            alerta_id: entity.alerta_id,
            fecha: entity.fecha,
        }
    }
}

/// Database row mapping for the confirmaciones_vigilancia table.
#[derive(Debug, Clone, FromRow)]
pub struct ConfirmationEntity {
    pub id: i64,
    pub vigilancia_id: i64,
    pub celular: String,
    pub confirma: bool,
    pub comentario: Option<String>,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
    pub fecha: DateTime<Utc>,
}
