//! Delivery record entity (alertas_enviadas row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use domain::models::{DeliveryRecord, DeliveryStatus};

/// Database row mapping for the alertas_enviadas table.
#[derive(Debug, Clone, FromRow)]
pub struct DeliveryEntity {
    pub id: i64,
    pub alerta_id: i64,
    pub celular_destinatario: String,
    pub nombre_destinatario: String,
    pub token: String,
    pub mensaje: String,
    pub estado_envio: String,
    pub rol_destinatario: String,
    pub entidad: Option<String>,
    pub fecha: DateTime<Utc>,
}

impl From<DeliveryEntity> for DeliveryRecord {
    fn from(entity: DeliveryEntity) -> Self {
        Self {
            id: entity.id,
            alerta_id: entity.alerta_id,
            celular_destinatario: entity.celular_destinatario,
            nombre_destinatario: entity.nombre_destinatario,
            token: entity.token,
            mensaje: entity.mensaje,
            estado_envio: DeliveryStatus::parse(&entity.estado_envio),
            rol_destinatario: entity.rol_destinatario,
            entidad: entity.entidad,
            fecha: entity.fecha,
        }
    }
}
