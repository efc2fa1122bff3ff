//! Background fan-out of one alert to its resolved recipients.
//!
//! Dispatch runs after the submitter has been acknowledged; a delivery
//! failure can never roll back an accepted alert. Every recipient gets one
//! durable delivery record regardless of outcome.

use std::sync::Arc;

use serde_json::json;
use sqlx::PgPool;
use tokio::task::JoinSet;
use tracing::{error, warn};

use domain::models::{Alert, DeliveryStatus, Recipient};
use domain::protocol::CircleMessages;
use domain::services::{PushOutcome, PushService};
use persistence::repositories::{DeliveryRepository, PersonRepository, PushTokenRepository};
use shared::phone::PhoneKey;

use crate::middleware::metrics::record_dispatch_outcome;

/// Delivery status recorded when a recipient has no usable token.
const NO_TOKEN: &str = "sin_token_fcm";

/// Fans out one alert to all recipients in parallel.
#[derive(Clone)]
pub struct Dispatcher {
    tokens: PushTokenRepository,
    persons: PersonRepository,
    deliveries: DeliveryRepository,
    push: Option<Arc<dyn PushService>>,
}

impl Dispatcher {
    pub fn new(pool: PgPool, push: Option<Arc<dyn PushService>>) -> Self {
        Self {
            tokens: PushTokenRepository::new(pool.clone()),
            persons: PersonRepository::new(pool.clone()),
            deliveries: DeliveryRepository::new(pool),
            push,
        }
    }

    /// Delivers to every recipient concurrently, one task per recipient.
    /// Each task resolves a token, attempts the push and records the
    /// outcome; a panic or error in one task never affects the others.
    pub async fn dispatch(&self, alert: Alert, recipients: Vec<Recipient>, messages: CircleMessages) {
        let messages = Arc::new(messages);
        let alert = Arc::new(alert);
        let mut tasks = JoinSet::new();

        for recipient in recipients {
            let dispatcher = self.clone();
            let alert = alert.clone();
            let messages = messages.clone();
            tasks.spawn(async move {
                dispatcher.deliver_one(&alert, recipient, &messages).await;
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!("Dispatch task failed: {}", e);
            }
        }
    }

    /// Delivers to one recipient and records the result.
    async fn deliver_one(&self, alert: &Alert, recipient: Recipient, messages: &CircleMessages) {
        let mensaje = match recipient.circle {
            domain::models::Circle::Personal => &messages.personal,
            domain::models::Circle::Institucional => &messages.institutional,
            domain::models::Circle::Comunitario => &messages.community,
        };

        let token = match self.resolve_token(&recipient).await {
            Ok(token) => token,
            Err(e) => {
                error!(
                    celular = %recipient.celular,
                    "Token lookup failed: {}", e
                );
                None
            }
        };

        let circle_label = recipient.circle.as_str();

        let (token_value, estado) = match token {
            Some(token) => {
                let outcome = self.push_to(&token, alert, mensaje).await;
                let estado = if outcome.is_sent() {
                    DeliveryStatus::Enviado
                } else {
                    DeliveryStatus::Fallido
                };
                match &outcome {
                    PushOutcome::Sent => record_dispatch_outcome(circle_label, "sent"),
                    PushOutcome::Unregistered => {
                        record_dispatch_outcome(circle_label, "unregistered");
                        if let Err(e) = self.tokens.invalidate_token(&token).await {
                            error!("Token invalidation failed: {}", e);
                        }
                    }
                    PushOutcome::Failed(reason) => {
                        record_dispatch_outcome(circle_label, "failed");
                        warn!(
                            celular = %recipient.celular,
                            "Push delivery failed: {}", reason
                        );
                    }
                }
                (token, estado)
            }
            None => {
                record_dispatch_outcome(circle_label, "no_token");
                (NO_TOKEN.to_string(), DeliveryStatus::Fallido)
            }
        };

        let result = self
            .deliveries
            .record(
                alert.id,
                &recipient.celular,
                &recipient.nombre,
                &token_value,
                mensaje,
                estado.as_str(),
                circle_label,
                recipient.entidad.as_deref(),
            )
            .await;
        if let Err(e) = result {
            error!(
                alerta_id = alert.id,
                celular = %recipient.celular,
                "Delivery record insert failed: {}", e
            );
        }
    }

    /// Token fallback chain: latest valid registered token, then the token
    /// stored on the user profile, then nothing.
    async fn resolve_token(&self, recipient: &Recipient) -> Result<Option<String>, sqlx::Error> {
        let Ok(phone) = PhoneKey::parse(&recipient.celular) else {
            return Ok(None);
        };

        if let Some(row) = self.tokens.find_latest_valid(&phone).await? {
            return Ok(Some(row.token));
        }

        Ok(self
            .persons
            .find_by_phone(&phone)
            .await?
            .and_then(|p| p.fcm_token)
            .filter(|t| !t.trim().is_empty()))
    }

    async fn push_to(&self, token: &str, alert: &Alert, mensaje: &str) -> PushOutcome {
        let Some(push) = &self.push else {
            return PushOutcome::Failed("push transport disabled".to_string());
        };

        push.deliver(token, "🆘 Alerta SOS", mensaje, push_data(alert))
            .await
    }
}

/// Data payload attached to every alert push.
fn push_data(alert: &Alert) -> serde_json::Value {
    let mut data = json!({
        "tipo": "alerta_sos",
        "alertaId": alert.id.to_string(),
        "nivel": alert.nivel.level().to_string(),
        "celular": alert.celular,
    });
    if let (Some(lat), Some(lon)) = (alert.latitud, alert.longitud) {
        data["latitud"] = json!(lat.to_string());
        data["longitud"] = json!(lon.to_string());
        data["mapsUrl"] = json!(format!("https://maps.google.com/?q={lat},{lon}"));
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::models::{AlertChannel, Tier};

    fn alert(lat: Option<f64>, lon: Option<f64>) -> Alert {
        Alert {
            id: 42,
            celular: "3001234567".into(),
            nombre: "Ana".into(),
            mensaje: "ayuda".into(),
            tipo_alerta: "seguridad".into(),
            nivel: Tier::Critica,
            latitud: lat,
            longitud: lon,
            fuente_alerta: AlertChannel::App,
            atendida: false,
            bateria_dispositivo: Some(80),
            fecha_hora: Utc::now(),
        }
    }

    #[test]
    fn test_push_data_includes_maps_url_with_coords() {
        let data = push_data(&alert(Some(4.711), Some(-74.072)));
        assert_eq!(data["alertaId"], "42");
        assert_eq!(data["nivel"], "3");
        assert!(data["mapsUrl"]
            .as_str()
            .expect("mapsUrl should be a string")
            .contains("4.711"));
    }

    #[test]
    fn test_push_data_omits_maps_url_without_coords() {
        let data = push_data(&alert(None, None));
        assert!(data.get("mapsUrl").is_none());
        assert!(data.get("latitud").is_none());
    }
}
