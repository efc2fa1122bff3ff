//! Alert domain model and payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Severity tier of an alert. Drives which recipient circles activate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    /// Nivel 1: personal circle only.
    Leve,
    /// Nivel 2: personal plus institutional circles.
    Grave,
    /// Nivel 3: all circles including the community network.
    Critica,
}

impl Tier {
    /// Builds a tier from a raw level, clamping anything outside {1, 2, 3}
    /// to the default level 2.
    pub fn from_level(level: i16) -> Self {
        match level {
            1 => Tier::Leve,
            3 => Tier::Critica,
            _ => Tier::Grave,
        }
    }

    pub fn level(self) -> i16 {
        match self {
            Tier::Leve => 1,
            Tier::Grave => 2,
            Tier::Critica => 3,
        }
    }

    /// Institutional responders activate at tier 2 and above.
    pub fn activates_institutional(self) -> bool {
        self >= Tier::Grave
    }

    /// The community network activates only at tier 3.
    pub fn activates_community(self) -> bool {
        self >= Tier::Critica
    }
}

impl Serialize for Tier {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i16(self.level())
    }
}

impl<'de> Deserialize<'de> for Tier {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let level = i16::deserialize(deserializer)?;
        Ok(Tier::from_level(level))
    }
}

/// Origin channel of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertChannel {
    App,
    ManillaBle,
    BotonEsp32,
    Voz,
    /// Created on behalf of a person whose distress signal was detected
    /// indirectly (e.g. a lost paired device seen over BLE).
    Relay,
}

impl AlertChannel {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertChannel::App => "app",
            AlertChannel::ManillaBle => "manilla_ble",
            AlertChannel::BotonEsp32 => "boton_esp32",
            AlertChannel::Voz => "voz",
            AlertChannel::Relay => "relay",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "manilla_ble" => AlertChannel::ManillaBle,
            "boton_esp32" => AlertChannel::BotonEsp32,
            "voz" => AlertChannel::Voz,
            "relay" => AlertChannel::Relay,
            _ => AlertChannel::App,
        }
    }
}

impl std::fmt::Display for AlertChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An emergency alert. Immutable once created except the handled flag and
/// the append-only analysis annotation on the message.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: i64,
    pub celular: String,
    pub nombre: String,
    pub mensaje: String,
    pub tipo_alerta: String,
    pub nivel: Tier,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
    pub fuente_alerta: AlertChannel,
    pub atendida: bool,
    pub bateria_dispositivo: Option<i32>,
    pub fecha_hora: DateTime<Utc>,
}

impl Alert {
    pub fn coordinates(&self) -> Option<crate::geo::Coordinates> {
        match (self.latitud, self.longitud) {
            (Some(lat), Some(lon)) => Some(crate::geo::Coordinates::new(lat, lon)),
            _ => None,
        }
    }

    /// Whether this alert still absorbs a relayed re-report arriving at
    /// `now`. The boundary is inclusive: a re-report exactly `window_min`
    /// minutes after the original folds into it.
    pub fn absorbs_relay_at(&self, now: DateTime<Utc>, window_min: i64) -> bool {
        now.signed_duration_since(self.fecha_hora) <= chrono::Duration::minutes(window_min)
    }
}

/// Request payload for alert submission.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAlertRequest {
    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub celular: String,

    pub nombre: Option<String>,

    /// Free-text classification label, e.g. "seguridad" or "robo_armado".
    #[serde(default = "default_tipo_alerta")]
    pub tipo_alerta: String,

    /// Requested severity level 1-3. Out-of-range values fall back to 2.
    pub nivel: Option<i16>,

    pub mensaje: Option<String>,

    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub latitud: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub longitud: Option<f64>,

    #[serde(default)]
    pub fuente_alerta: Option<AlertChannel>,

    pub bateria_dispositivo: Option<i32>,
}

fn default_tipo_alerta() -> String {
    "emergencia".to_string()
}

/// One of the top institutional matches echoed back to the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstitutionalMatch {
    pub nombre: String,
    pub entidad: Option<String>,
    pub distancia_km: f64,
}

/// Synchronous acknowledgement returned before dispatch runs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAlertResponse {
    pub success: bool,
    pub alerta_id: i64,
    pub nivel: Tier,
    /// True when a relay re-report was folded into an existing alert.
    pub duplicada: bool,
    pub cuidadores_primera_linea: usize,
    pub cuidadores_institucionales: usize,
    pub red_comunitaria: usize,
    pub institucionales_detalle: Vec<InstitutionalMatch>,
    pub tiempo_respuesta_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_tier_from_level_valid() {
        assert_eq!(Tier::from_level(1), Tier::Leve);
        assert_eq!(Tier::from_level(2), Tier::Grave);
        assert_eq!(Tier::from_level(3), Tier::Critica);
    }

    #[test]
    fn test_tier_out_of_range_defaults_to_grave() {
        assert_eq!(Tier::from_level(0), Tier::Grave);
        assert_eq!(Tier::from_level(-5), Tier::Grave);
        assert_eq!(Tier::from_level(4), Tier::Grave);
        assert_eq!(Tier::from_level(99), Tier::Grave);
    }

    #[test]
    fn test_tier_roundtrip_level() {
        for level in 1..=3 {
            assert_eq!(Tier::from_level(level).level(), level);
        }
    }

    #[test]
    fn test_tier_circle_activation() {
        assert!(!Tier::Leve.activates_institutional());
        assert!(!Tier::Leve.activates_community());
        assert!(Tier::Grave.activates_institutional());
        assert!(!Tier::Grave.activates_community());
        assert!(Tier::Critica.activates_institutional());
        assert!(Tier::Critica.activates_community());
    }

    #[test]
    fn test_tier_serde_as_integer() {
        let json = serde_json::to_string(&Tier::Critica).unwrap();
        assert_eq!(json, "3");
        let tier: Tier = serde_json::from_str("1").unwrap();
        assert_eq!(tier, Tier::Leve);
        // Out of range deserializes to the default tier rather than failing.
        let tier: Tier = serde_json::from_str("7").unwrap();
        assert_eq!(tier, Tier::Grave);
    }

    #[test]
    fn test_channel_roundtrip() {
        for ch in [
            AlertChannel::App,
            AlertChannel::ManillaBle,
            AlertChannel::BotonEsp32,
            AlertChannel::Voz,
            AlertChannel::Relay,
        ] {
            assert_eq!(AlertChannel::parse(ch.as_str()), ch);
        }
    }

    #[test]
    fn test_channel_unknown_defaults_to_app() {
        assert_eq!(AlertChannel::parse("fax"), AlertChannel::App);
    }

    #[test]
    fn test_submit_request_validation() {
        let req = SubmitAlertRequest {
            celular: "3001234567".into(),
            nombre: None,
            tipo_alerta: "seguridad".into(),
            nivel: Some(3),
            mensaje: None,
            latitud: Some(4.711),
            longitud: Some(-74.072),
            fuente_alerta: Some(AlertChannel::App),
            bateria_dispositivo: None,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_submit_request_invalid_coordinates() {
        let req = SubmitAlertRequest {
            celular: "3001234567".into(),
            nombre: None,
            tipo_alerta: "seguridad".into(),
            nivel: None,
            mensaje: None,
            latitud: Some(95.0),
            longitud: Some(-74.072),
            fuente_alerta: None,
            bateria_dispositivo: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_submit_request_invalid_phone() {
        let req = SubmitAlertRequest {
            celular: "12".into(),
            nombre: None,
            tipo_alerta: "emergencia".into(),
            nivel: None,
            mensaje: None,
            latitud: None,
            longitud: None,
            fuente_alerta: None,
            bateria_dispositivo: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_alert_coordinates_require_both_axes() {
        let mut alert = Alert {
            id: 1,
            celular: "573001234567".into(),
            nombre: "Ana".into(),
            mensaje: "ayuda".into(),
            tipo_alerta: "seguridad".into(),
            nivel: Tier::Critica,
            latitud: Some(4.711),
            longitud: None,
            fuente_alerta: AlertChannel::App,
            atendida: false,
            bateria_dispositivo: None,
            fecha_hora: Utc::now(),
        };
        assert!(alert.coordinates().is_none());
        alert.longitud = Some(-74.072);
        assert!(alert.coordinates().is_some());
    }

    fn relay_alert(fecha_hora: DateTime<Utc>) -> Alert {
        Alert {
            id: 1,
            celular: "573001234567".into(),
            nombre: "Ana".into(),
            mensaje: "ayuda".into(),
            tipo_alerta: "seguridad".into(),
            nivel: Tier::Grave,
            latitud: None,
            longitud: None,
            fuente_alerta: AlertChannel::Relay,
            atendida: false,
            bateria_dispositivo: None,
            fecha_hora,
        }
    }

    #[test]
    fn test_relay_window_absorbs_recent_re_report() {
        let created = Utc::now();
        let alert = relay_alert(created);
        assert!(alert.absorbs_relay_at(created + chrono::Duration::minutes(3), 5));
    }

    #[test]
    fn test_relay_window_boundary_inclusive() {
        let created = Utc::now();
        let alert = relay_alert(created);
        assert!(alert.absorbs_relay_at(created + chrono::Duration::minutes(5), 5));
    }

    #[test]
    fn test_relay_window_expired_re_report_not_absorbed() {
        let created = Utc::now();
        let alert = relay_alert(created);
        assert!(!alert.absorbs_relay_at(created + chrono::Duration::minutes(6), 5));
    }
}
