//! Community network location pings.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A ping older than this is stale and excluded from radius searches.
pub const FRESHNESS_WINDOW_MIN: i64 = 30;

/// Latest known position of a community participant. One row per person,
/// upserted on every report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPing {
    pub celular: String,
    pub id_persona: Option<i32>,
    pub nombre: Option<String>,
    pub latitud: f64,
    pub longitud: f64,
    pub disponible: bool,
    pub actualizado_at: DateTime<Utc>,
}

impl LocationPing {
    /// A ping is fresh when updated within the freshness window.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now - self.actualizado_at <= Duration::minutes(FRESHNESS_WINDOW_MIN)
    }
}

/// Request payload for upserting a location ping.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpsertPingRequest {
    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub celular: String,

    pub nombre: Option<String>,

    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub latitud: f64,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub longitud: f64,

    #[serde(default = "default_disponible")]
    pub disponible: bool,
}

fn default_disponible() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ping(age_minutes: i64) -> LocationPing {
        LocationPing {
            celular: "573001234567".into(),
            id_persona: None,
            nombre: None,
            latitud: 4.711,
            longitud: -74.072,
            disponible: true,
            actualizado_at: Utc::now() - Duration::minutes(age_minutes),
        }
    }

    #[test]
    fn test_recent_ping_is_fresh() {
        assert!(ping(0).is_fresh(Utc::now()));
        assert!(ping(29).is_fresh(Utc::now()));
    }

    #[test]
    fn test_old_ping_is_stale() {
        assert!(!ping(31).is_fresh(Utc::now()));
        assert!(!ping(600).is_fresh(Utc::now()));
    }
}
