//! Alert entity (alertas_panico row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use domain::models::{Alert, AlertChannel, Tier};

/// Database row mapping for the alertas_panico table.
#[derive(Debug, Clone, FromRow)]
pub struct AlertEntity {
    pub id: i64,
    pub celular: String,
    pub nombre: String,
    pub mensaje: String,
    pub tipo_alerta: String,
    pub nivel_emergencia: i16,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
    pub fuente_alerta: String,
    pub atendida: bool,
    pub bateria_dispositivo: Option<i32>,
    pub fecha_hora: DateTime<Utc>,
}

impl From<AlertEntity> for Alert {
    fn from(entity: AlertEntity) -> Self {
        Self {
            id: entity.id,
            celular: entity.celular,
            nombre: entity.nombre,
            mensaje: entity.mensaje,
            tipo_alerta: entity.tipo_alerta,
            nivel: Tier::from_level(entity.nivel_emergencia),
            latitud: entity.latitud,
            longitud: entity.longitud,
            fuente_alerta: AlertChannel::parse(&entity.fuente_alerta),
            atendida: entity.atendida,
            bateria_dispositivo: entity.bateria_dispositivo,
            fecha_hora: entity.fecha_hora,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(nivel: i16, fuente: &str) -> AlertEntity {
        AlertEntity {
            id: 1,
            celular: "573001234567".into(),
            nombre: "Ana".into(),
            mensaje: "ayuda".into(),
            tipo_alerta: "seguridad".into(),
            nivel_emergencia: nivel,
            latitud: Some(4.711),
            longitud: Some(-74.072),
            fuente_alerta: fuente.into(),
            atendida: false,
            bateria_dispositivo: None,
            fecha_hora: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_conversion_parses_tier_and_channel() {
        let alert = Alert::from(entity(3, "manilla_ble"));
        assert_eq!(alert.nivel, Tier::Critica);
        assert_eq!(alert.fuente_alerta, AlertChannel::ManillaBle);
    }

    #[test]
    fn test_out_of_range_row_level_falls_back() {
        let alert = Alert::from(entity(7, "desconocido"));
        assert_eq!(alert.nivel, Tier::Grave);
        assert_eq!(alert.fuente_alerta, AlertChannel::App);
    }
}
