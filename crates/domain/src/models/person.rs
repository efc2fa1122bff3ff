//! Person domain model.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A registered person. Never hard-deleted; `bloqueado` is flipped only by
/// the abuse engine.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: i32,
    pub nombre: String,
    pub apellido: Option<String>,
    pub celular: String,
    /// Whether this person participates in the community response network.
    pub disponible_red: bool,
    pub bloqueado: bool,
    pub motivo_bloqueo: Option<String>,
    pub fecha_bloqueo: Option<DateTime<Utc>>,
    pub fecha_registro: DateTime<Utc>,
}

impl Person {
    pub fn display_name(&self) -> String {
        match &self.apellido {
            Some(apellido) if !apellido.is_empty() => format!("{} {}", self.nombre, apellido),
            _ => self.nombre.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persona() -> Person {
        Person {
            id: 7,
            nombre: "Ana".into(),
            apellido: Some("Gomez".into()),
            celular: "573001234567".into(),
            disponible_red: true,
            bloqueado: false,
            motivo_bloqueo: None,
            fecha_bloqueo: None,
            fecha_registro: Utc::now(),
        }
    }

    #[test]
    fn test_display_name_with_surname() {
        assert_eq!(persona().display_name(), "Ana Gomez");
    }

    #[test]
    fn test_display_name_without_surname() {
        let mut p = persona();
        p.apellido = None;
        assert_eq!(p.display_name(), "Ana");
        p.apellido = Some(String::new());
        assert_eq!(p.display_name(), "Ana");
    }
}
