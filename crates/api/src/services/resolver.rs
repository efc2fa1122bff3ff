//! Recipient resolution: who hears about an alert.
//!
//! The personal circle always participates. The institutional circle joins
//! at tier 2+ when the alert carries coordinates; the community circle at
//! tier 3 under the same condition. An alert without coordinates simply
//! gets empty outer circles.

use std::collections::HashSet;

use chrono::Utc;
use sqlx::PgPool;

use domain::geo::{self, Coordinates};
use domain::models::{Circle, Recipient, ResolvedRecipients, Tier};
use domain::protocol::Protocol;
use persistence::entities::{
    CaregiverEntity, ContactEntity, InstitutionEntity, LocationPingEntity,
};
use persistence::repositories::{
    CaregiverRepository, ContactRepository, InstitutionRepository, LocationPingRepository,
};
use shared::phone::PhoneKey;

use crate::config::RoutingConfig;

/// Resolves the three recipient circles for one alert.
#[derive(Clone)]
pub struct RecipientResolver {
    contacts: ContactRepository,
    caregivers: CaregiverRepository,
    institutions: InstitutionRepository,
    pings: LocationPingRepository,
    routing: RoutingConfig,
}

impl RecipientResolver {
    pub fn new(pool: PgPool, routing: RoutingConfig) -> Self {
        Self {
            contacts: ContactRepository::new(pool.clone()),
            caregivers: CaregiverRepository::new(pool.clone()),
            institutions: InstitutionRepository::new(pool.clone()),
            pings: LocationPingRepository::new(pool),
            routing,
        }
    }

    /// Resolves recipients for the alert source at the given tier.
    ///
    /// The personal lookup runs first; the two geo circles then run
    /// concurrently.
    pub async fn resolve(
        &self,
        source: &PhoneKey,
        tier: Tier,
        coords: Option<Coordinates>,
        protocol: &Protocol,
    ) -> Result<ResolvedRecipients, sqlx::Error> {
        let contacts = self.contacts.find_emergency_contacts(source).await?;
        let caregivers = self.caregivers.find_for_watched(source).await?;
        let personal = merge_personal(contacts, caregivers);

        let (institutional, community) = match (coords, tier) {
            (Some(origin), tier) => {
                // Preventive classifications stay in the personal circle
                // until a witness quorum escalates them.
                let want_institutional = !protocol.preventive_only
                    && tier.activates_institutional()
                    && (protocol.circles.police
                        || protocol.circles.ambulance
                        || protocol.circles.fire);
                let want_community = !protocol.preventive_only
                    && tier.activates_community()
                    && protocol.circles.community;
                let (institutions, pings) = tokio::join!(
                    async {
                        if want_institutional {
                            self.institutions.find_active_located().await
                        } else {
                            Ok(Vec::new())
                        }
                    },
                    async {
                        if want_community {
                            self.pings
                                .find_fresh_candidates(source, self.routing.ping_freshness_min)
                                .await
                        } else {
                            Ok(Vec::new())
                        }
                    }
                );
                (
                    institutional_circle(
                        institutions?,
                        origin,
                        self.routing.activation_radius_km,
                        protocol,
                    ),
                    community_circle(pings?, origin, self.routing.activation_radius_km),
                )
            }
            (None, _) => (Vec::new(), Vec::new()),
        };

        Ok(ResolvedRecipients {
            personal,
            institutional,
            community,
        })
    }
}

/// Merges trusted contacts and standing caregivers into one deduplicated
/// personal circle. When both lists carry the same phone, the contact
/// entry wins.
fn merge_personal(contacts: Vec<ContactEntity>, caregivers: Vec<CaregiverEntity>) -> Vec<Recipient> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut personal = Vec::new();

    for contact in contacts {
        let key = canonical_digits(&contact.celular);
        if seen.insert(key) {
            personal.push(Recipient {
                celular: contact.celular,
                nombre: contact.nombre,
                circle: Circle::Personal,
                id_persona: None,
                entidad: None,
                distancia_km: None,
            });
        }
    }

    for caregiver in caregivers {
        let key = canonical_digits(&caregiver.celular_cuidador);
        if seen.insert(key) {
            personal.push(Recipient {
                nombre: caregiver
                    .nombre_cuidador
                    .unwrap_or_else(|| "Cuidador".to_string()),
                celular: caregiver.celular_cuidador,
                circle: Circle::Personal,
                id_persona: caregiver.id_persona_cuidador,
                entidad: None,
                distancia_km: None,
            });
        }
    }

    personal
}

/// Institutions within the activation radius that the protocol admits,
/// distance-sorted.
fn institutional_circle(
    institutions: Vec<InstitutionEntity>,
    origin: Coordinates,
    radius_km: f64,
    protocol: &Protocol,
) -> Vec<Recipient> {
    let admitted: Vec<InstitutionEntity> = institutions
        .into_iter()
        .filter(|i| i.coordinates().is_some() && protocol.admits_institution(&i.tipo))
        .collect();

    geo::nearby(origin, admitted, radius_km, |i| {
        // Filtered above; rows without coordinates never reach here.
        i.coordinates().unwrap_or(origin)
    })
    .into_iter()
    .map(|(i, distancia)| Recipient {
        celular: i.celular,
        nombre: i.nombre,
        circle: Circle::Institucional,
        id_persona: i.id_persona,
        entidad: i.entidad,
        distancia_km: Some(distancia),
    })
    .collect()
}

/// Fresh community pings within the activation radius, distance-sorted.
/// Availability, freshness and blocked-account filtering happen in SQL.
fn community_circle(
    pings: Vec<LocationPingEntity>,
    origin: Coordinates,
    radius_km: f64,
) -> Vec<Recipient> {
    // The SQL prefilter already bounds staleness; the domain rule is the
    // final word on freshness.
    let now = Utc::now();
    let fresh: Vec<LocationPingEntity> = pings
        .into_iter()
        .filter(|p| domain::models::LocationPing::from(p.clone()).is_fresh(now))
        .collect();

    geo::nearby(origin, fresh, radius_km, |p| {
        Coordinates::new(p.latitud, p.longitud)
    })
    .into_iter()
    .map(|(p, distancia)| Recipient {
        celular: p.celular,
        nombre: p.nombre.unwrap_or_else(|| "Vecino".to_string()),
        circle: Circle::Comunitario,
        id_persona: p.id_persona,
        entidad: None,
        distancia_km: Some(distancia),
    })
    .collect()
}

fn canonical_digits(raw: &str) -> String {
    PhoneKey::parse(raw)
        .map(|k| k.local().to_string())
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use domain::protocol::{ProtocolTable, RuntimeFlags};

    fn contact(celular: &str, nombre: &str) -> ContactEntity {
        ContactEntity {
            id: 1,
            usuario_id: 1,
            nombre: nombre.into(),
            celular: celular.into(),
            parentesco: None,
            disponible_emergencias: true,
            activo: true,
            fecha_registro: Utc::now(),
        }
    }

    fn caregiver(celular: &str, nombre: Option<&str>) -> CaregiverEntity {
        CaregiverEntity {
            id: 1,
            celular_cuidado: "3001112233".into(),
            celular_cuidador: celular.into(),
            id_persona_cuidador: Some(7),
            nombre_cuidador: nombre.map(Into::into),
            activo: true,
            fecha_registro: Utc::now(),
        }
    }

    fn institution(celular: &str, tipo: &str, lat: f64, lon: f64) -> InstitutionEntity {
        InstitutionEntity {
            id: 1,
            nombre: format!("Estación {tipo}"),
            entidad: Some(tipo.to_uppercase()),
            celular: celular.into(),
            tipo: tipo.into(),
            id_persona: None,
            latitud: Some(lat),
            longitud: Some(lon),
            activo: true,
            fecha_registro: Utc::now(),
        }
    }

    fn ping(celular: &str, lat: f64, lon: f64, age_minutes: i64) -> LocationPingEntity {
        LocationPingEntity {
            id: 1,
            celular: celular.into(),
            id_persona: None,
            nombre: Some("Vecina".into()),
            latitud: lat,
            longitud: lon,
            disponible: true,
            actualizado_at: Utc::now() - Duration::minutes(age_minutes),
        }
    }

    #[test]
    fn test_contact_wins_over_caregiver_with_same_phone() {
        // Same person stored with and without the country prefix.
        let merged = merge_personal(
            vec![contact("3001234567", "Mamá")],
            vec![caregiver("573001234567", Some("Cuidadora"))],
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].nombre, "Mamá");
    }

    #[test]
    fn test_distinct_caregiver_is_kept() {
        let merged = merge_personal(
            vec![contact("3001234567", "Mamá")],
            vec![caregiver("3009998877", None)],
        );
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1].nombre, "Cuidador");
        assert_eq!(merged[1].circle, Circle::Personal);
    }

    #[test]
    fn test_institutional_circle_filters_by_protocol_kind() {
        let origin = Coordinates::new(4.711, -74.072);
        let protocol = ProtocolTable::resolve("seguridad", RuntimeFlags::default());
        let circle = institutional_circle(
            vec![
                institution("3010000001", "policia", 4.711, -74.072),
                institution("3010000002", "ambulancia", 4.711, -74.072),
            ],
            origin,
            1.0,
            &protocol,
        );
        assert_eq!(circle.len(), 1);
        assert_eq!(circle[0].celular, "3010000001");
        assert_eq!(circle[0].circle, Circle::Institucional);
    }

    #[test]
    fn test_unknown_label_admits_every_institution_type() {
        let origin = Coordinates::new(4.711, -74.072);
        let protocol = ProtocolTable::resolve("meteorito", RuntimeFlags::default());
        let circle = institutional_circle(
            vec![
                institution("3010000001", "policia", 4.711, -74.072),
                institution("3010000002", "ambulancia", 4.711, -74.072),
                institution("3010000003", "bomberos", 4.711, -74.072),
            ],
            origin,
            1.0,
            &protocol,
        );
        assert_eq!(circle.len(), 3);
    }

    #[test]
    fn test_institutional_circle_excludes_out_of_radius() {
        let origin = Coordinates::new(4.711, -74.072);
        let protocol = ProtocolTable::resolve("seguridad", RuntimeFlags::default());
        // Roughly 5 km north.
        let circle = institutional_circle(
            vec![institution("3010000001", "policia", 4.756, -74.072)],
            origin,
            1.0,
            &protocol,
        );
        assert!(circle.is_empty());
    }

    #[test]
    fn test_community_circle_drops_stale_pings() {
        let origin = Coordinates::new(4.711, -74.072);
        let circle = community_circle(
            vec![
                ping("3020000001", 4.711, -74.072, 5),
                ping("3020000002", 4.711, -74.072, 45),
            ],
            origin,
            1.0,
        );
        assert_eq!(circle.len(), 1);
        assert_eq!(circle[0].celular, "3020000001");
    }

    #[test]
    fn test_community_circle_sorted_by_distance() {
        let origin = Coordinates::new(4.711, -74.072);
        let circle = community_circle(
            vec![
                ping("3020000001", 4.716, -74.072, 1),
                ping("3020000002", 4.712, -74.072, 1),
            ],
            origin,
            1.0,
        );
        assert_eq!(circle.len(), 2);
        assert_eq!(circle[0].celular, "3020000002");
    }
}
