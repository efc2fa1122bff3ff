//! Institutional responder entity (cuidadores_institucionales row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use domain::geo::Coordinates;

/// Database row mapping for the cuidadores_institucionales table.
#[derive(Debug, Clone, FromRow)]
pub struct InstitutionEntity {
    pub id: i32,
    pub nombre: String,
    pub entidad: Option<String>,
    pub celular: String,
    pub tipo: String,
    pub id_persona: Option<i32>,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
    pub activo: bool,
    pub fecha_registro: DateTime<Utc>,
}

impl InstitutionEntity {
    /// Coordinates, when both axes are present. The located-institutions
    /// query guarantees this for rows it returns.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitud, self.longitud) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        }
    }
}
