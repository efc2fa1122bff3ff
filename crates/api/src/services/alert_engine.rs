//! Alert ingestion and response handling.
//!
//! Ingestion acknowledges the submitter as soon as the alert is durable and
//! the circles are resolved; the actual fan-out happens in a background
//! task. A relayed re-report inside the deduplication window folds into the
//! original alert instead of creating a new one.

use std::time::Instant;

use chrono::Utc;
use sqlx::PgPool;
use tracing::{info, warn};

use domain::geo::Coordinates;
use domain::models::{
    Alert, AlertChannel, AlertResponse, DeliverySummary, InstitutionalMatch, ResolvedRecipients,
    RespondRequest, RespondResponse, SubmitAlertRequest, SubmitAlertResponse, Tier,
};
use domain::protocol::{MessageContext, ProtocolTable, RuntimeFlags};
use domain::services::PushService;
use persistence::repositories::{
    AlertRepository, DeliveryRepository, InstitutionRepository, PersonRepository,
    PushTokenRepository, ResponseRepository,
};
use shared::phone::PhoneKey;

use crate::config::RoutingConfig;
use crate::error::ApiError;
use crate::middleware::metrics::record_alert_received;
use crate::services::dispatch::Dispatcher;
use crate::services::resolver::RecipientResolver;

/// Full detail view of one alert.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertDetail {
    pub alerta: Alert,
    pub envios: DeliverySummary,
    pub respuestas: Vec<AlertResponse>,
}

/// Orchestrates ingestion, response handling and alert lookups.
#[derive(Clone)]
pub struct AlertEngine {
    alerts: AlertRepository,
    persons: PersonRepository,
    responses: ResponseRepository,
    institutions: InstitutionRepository,
    deliveries: DeliveryRepository,
    tokens: PushTokenRepository,
    resolver: RecipientResolver,
    dispatcher: Dispatcher,
    routing: RoutingConfig,
    push: Option<std::sync::Arc<dyn PushService>>,
}

impl AlertEngine {
    pub fn new(
        pool: PgPool,
        routing: RoutingConfig,
        push: Option<std::sync::Arc<dyn PushService>>,
    ) -> Self {
        Self {
            alerts: AlertRepository::new(pool.clone()),
            persons: PersonRepository::new(pool.clone()),
            responses: ResponseRepository::new(pool.clone()),
            institutions: InstitutionRepository::new(pool.clone()),
            deliveries: DeliveryRepository::new(pool.clone()),
            tokens: PushTokenRepository::new(pool.clone()),
            resolver: RecipientResolver::new(pool.clone(), routing.clone()),
            dispatcher: Dispatcher::new(pool, push.clone()),
            routing,
            push,
        }
    }

    /// Ingests one alert: normalize, persist, resolve circles, spawn the
    /// fan-out, acknowledge. Resolution failure aborts the submission;
    /// anything after the ack is best-effort.
    pub async fn submit(&self, req: SubmitAlertRequest) -> Result<SubmitAlertResponse, ApiError> {
        let started = Instant::now();

        let source = PhoneKey::parse(&req.celular)?;
        let channel = req.fuente_alerta.unwrap_or(AlertChannel::App);

        // A relayed re-report of a recent alert is folded, not re-routed.
        // The SQL lookup prefilters on the window; the domain rule is the
        // final word.
        if channel == AlertChannel::Relay {
            let window = self.routing.relay_dedup_window_min;
            if let Some(existing) = self.alerts.find_recent_relay(&source, window).await? {
                let existing = Alert::from(existing);
                if existing.absorbs_relay_at(Utc::now(), window) {
                    info!(alerta_id = existing.id, "Relay folded into recent alert");
                    return Ok(SubmitAlertResponse {
                        success: true,
                        alerta_id: existing.id,
                        nivel: existing.nivel,
                        duplicada: true,
                        cuidadores_primera_linea: 0,
                        cuidadores_institucionales: 0,
                        red_comunitaria: 0,
                        institucionales_detalle: Vec::new(),
                        tiempo_respuesta_ms: started.elapsed().as_millis() as u64,
                    });
                }
            }
        }

        let nombre = match req.nombre {
            Some(n) if !n.trim().is_empty() => n,
            _ => self.persons.resolve_display_name(&source).await?,
        };

        let protocol = ProtocolTable::resolve(&req.tipo_alerta, RuntimeFlags::default());
        let caller_tier = Tier::from_level(req.nivel.unwrap_or(2));
        // The protocol can raise the severity floor but a caller can never
        // lower it below what the classification demands.
        let tier = caller_tier.max(protocol.min_tier);

        let coords = match (req.latitud, req.longitud) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        };

        let entity = self
            .alerts
            .create(
                source.prefixed(),
                &nombre,
                req.mensaje.as_deref().unwrap_or(""),
                &req.tipo_alerta,
                tier.level(),
                req.latitud,
                req.longitud,
                channel.as_str(),
                req.bateria_dispositivo,
            )
            .await?;
        let alert = Alert::from(entity);

        record_alert_received(channel.as_str(), tier.level());

        let resolved = self
            .resolver
            .resolve(&source, tier, coords, &protocol)
            .await?;

        // Messages render once per circle, after resolution so the
        // {distancia} placeholder carries the nearest match.
        let messages = protocol.render_messages(&MessageContext {
            nombre: nombre.clone(),
            ubicacion: coords.map(|c| format!("https://maps.google.com/?q={},{}", c.lat, c.lon)),
            distancia_km: nearest_distance(&resolved),
            descripcion: req.mensaje.clone(),
        });

        let institucionales_detalle: Vec<InstitutionalMatch> = resolved
            .institutional
            .iter()
            .take(self.routing.ack_detail_limit)
            .map(|r| InstitutionalMatch {
                nombre: r.nombre.clone(),
                entidad: r.entidad.clone(),
                distancia_km: r.distancia_km.unwrap_or(0.0),
            })
            .collect();

        let ack = SubmitAlertResponse {
            success: true,
            alerta_id: alert.id,
            nivel: tier,
            duplicada: false,
            cuidadores_primera_linea: resolved.personal.len(),
            cuidadores_institucionales: resolved.institutional.len(),
            red_comunitaria: resolved.community.len(),
            institucionales_detalle,
            tiempo_respuesta_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            alerta_id = alert.id,
            nivel = tier.level(),
            personal = ack.cuidadores_primera_linea,
            institucional = ack.cuidadores_institucionales,
            comunitaria = ack.red_comunitaria,
            "Alert accepted, dispatching"
        );

        // Fan-out runs after the ack; its failures never surface here.
        let dispatcher = self.dispatcher.clone();
        let recipients = resolved.into_dispatch_order();
        tokio::spawn(async move {
            dispatcher.dispatch(alert, recipients, messages).await;
        });

        Ok(ack)
    }

    /// Records a responder's answer to an alert and notifies the source
    /// that help is on the way.
    pub async fn respond(&self, req: RespondRequest) -> Result<RespondResponse, ApiError> {
        let responder_phone = PhoneKey::parse(&req.celular)?;

        let alert = self
            .alerts
            .find_by_id(req.alerta_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Alerta {} no existe", req.alerta_id)))?;

        let responder = self
            .persons
            .find_by_phone(&responder_phone)
            .await?
            .ok_or_else(|| ApiError::NotFound("Respondiente no registrado".to_string()))?;

        let nombre = domain::models::Person::from(responder.clone()).display_name();
        let entidad = self
            .institutions
            .find_by_phone(&responder_phone)
            .await?
            .and_then(|i| i.entidad);

        // Unique (alerta_id, celular) turns a duplicate answer into 409.
        self.responses
            .create(
                req.alerta_id,
                req.id_persona,
                responder_phone.prefixed(),
                &nombre,
                entidad.as_deref(),
                req.accion.as_str(),
                req.latitud,
                req.longitud,
                req.tiempo_estimado_min,
            )
            .await
            .map_err(|e| match ApiError::from(e) {
                ApiError::Conflict(_) => {
                    ApiError::Conflict("Ya respondiste a esta alerta".to_string())
                }
                other => other,
            })?;

        if let Err(e) = self.alerts.mark_handled(req.alerta_id).await {
            warn!(alerta_id = req.alerta_id, "mark_handled failed: {}", e);
        }

        self.notify_source(&alert.celular, &nombre, &req).await;

        Ok(RespondResponse {
            success: true,
            nombre,
            entidad,
            accion: req.accion,
        })
    }

    /// Alert detail: the alert itself plus delivery summary and responses.
    pub async fn detail(&self, alerta_id: i64) -> Result<AlertDetail, ApiError> {
        let alert = self
            .alerts
            .find_by_id(alerta_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Alerta {alerta_id} no existe")))?;

        let envios = self.deliveries.summarize(alerta_id).await?;
        let respuestas = self
            .responses
            .find_by_alert(alerta_id)
            .await?
            .into_iter()
            .map(AlertResponse::from)
            .collect();

        Ok(AlertDetail {
            alerta: Alert::from(alert),
            envios,
            respuestas,
        })
    }

    /// Responders list for one alert.
    pub async fn list_responses(&self, alerta_id: i64) -> Result<Vec<AlertResponse>, ApiError> {
        if self.alerts.find_by_id(alerta_id).await?.is_none() {
            return Err(ApiError::NotFound(format!("Alerta {alerta_id} no existe")));
        }
        Ok(self
            .responses
            .find_by_alert(alerta_id)
            .await?
            .into_iter()
            .map(AlertResponse::from)
            .collect())
    }

    /// Best-effort "help is on the way" push back to the alert source.
    async fn notify_source(&self, source_celular: &str, responder: &str, req: &RespondRequest) {
        let Some(push) = &self.push else {
            return;
        };
        let Ok(source) = PhoneKey::parse(source_celular) else {
            return;
        };

        let token = match self.tokens.find_latest_valid(&source).await {
            Ok(Some(row)) => row.token,
            Ok(None) => return,
            Err(e) => {
                warn!("Source token lookup failed: {}", e);
                return;
            }
        };

        let mut body = format!("{} {}", responder, req.accion.describe());
        if let Some(eta) = req.tiempo_estimado_min {
            body.push_str(&format!(" (llega en ~{eta} min)"));
        }

        let data = serde_json::json!({
            "tipo": "respuesta_alerta",
            "alertaId": req.alerta_id.to_string(),
            "accion": req.accion.as_str(),
        });
        let outcome = push.deliver(&token, "🚨 Ayuda en camino", &body, data).await;
        if !outcome.is_sent() {
            warn!(alerta_id = req.alerta_id, "Source notification not delivered");
        }
    }
}

/// Nearest geo-circle match in kilometers, if any circle resolved one.
fn nearest_distance(resolved: &ResolvedRecipients) -> Option<f64> {
    resolved
        .institutional
        .iter()
        .chain(resolved.community.iter())
        .filter_map(|r| r.distancia_km)
        .min_by(|a, b| a.total_cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::{Circle, Recipient};

    fn recipient(circle: Circle, distancia_km: Option<f64>) -> Recipient {
        Recipient {
            celular: "3001234567".into(),
            nombre: "Prueba".into(),
            circle,
            id_persona: None,
            entidad: None,
            distancia_km,
        }
    }

    #[test]
    fn test_nearest_distance_none_without_geo_circles() {
        let resolved = ResolvedRecipients {
            personal: vec![recipient(Circle::Personal, None)],
            institutional: Vec::new(),
            community: Vec::new(),
        };
        assert_eq!(nearest_distance(&resolved), None);
    }

    #[test]
    fn test_nearest_distance_spans_both_geo_circles() {
        let resolved = ResolvedRecipients {
            personal: Vec::new(),
            institutional: vec![recipient(Circle::Institucional, Some(0.8))],
            community: vec![recipient(Circle::Comunitario, Some(0.3))],
        };
        assert_eq!(nearest_distance(&resolved), Some(0.3));
    }
}
