//! Emergency text classification via the Anthropic Messages API.
//!
//! Advisory only: the classification never overrides an explicit caller
//! tier at ingestion. Upstream failures surface as 502 with no silent
//! fallback classification.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::time::Duration;
use tracing::warn;
use validator::Validate;

use persistence::repositories::AlertRepository;

use crate::config::ClassifierConfig;
use crate::error::ApiError;

/// Request payload for classification.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyRequest {
    #[validate(length(min = 3, max = 2000))]
    pub descripcion: String,

    /// When present, the short description is appended to this alert's
    /// stored message.
    pub alerta_id: Option<i64>,
}

/// Structured classification of an emergency description.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub tipo_alerta: String,
    pub nivel: i16,
    pub descripcion_corta: String,
    #[serde(default)]
    pub acciones: Vec<String>,
    #[serde(default)]
    pub llamar_123: bool,
    #[serde(default)]
    pub llamar_155: bool,
    #[serde(default)]
    pub confianza: f64,
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

const CLASSIFY_PROMPT: &str = "Eres el clasificador de emergencias de una red \
comunitaria SOS en Colombia. Analiza la siguiente descripción y responde \
ÚNICAMENTE con un objeto JSON con estas claves: tipoAlerta (seguridad, salud, \
violencia, incendio, caida, emergencia, robo, robo_armado, sospecha u otro), \
nivel (1 leve, 2 grave, 3 crítica), descripcionCorta (máx 120 caracteres), \
acciones (lista corta de recomendaciones), llamar123 (bool), llamar155 (bool) \
y confianza (0.0 a 1.0).\n\nDescripción: ";

/// Classifies free-text emergency descriptions.
#[derive(Clone)]
pub struct Classifier {
    client: Client,
    config: ClassifierConfig,
    alerts: AlertRepository,
}

impl Classifier {
    pub fn new(pool: PgPool, config: ClassifierConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            config,
            alerts: AlertRepository::new(pool),
        })
    }

    /// Classifies a description, optionally annotating an existing alert.
    pub async fn classify(&self, req: ClassifyRequest) -> Result<Classification, ApiError> {
        if !self.config.enabled {
            return Err(ApiError::ServiceUnavailable(
                "Clasificador no configurado".to_string(),
            ));
        }

        let classification = self.call_model(&req.descripcion).await?;

        if let Some(alerta_id) = req.alerta_id {
            if let Err(e) = self
                .alerts
                .append_analysis(alerta_id, &classification.descripcion_corta)
                .await
            {
                warn!(alerta_id, "Failed to annotate alert: {}", e);
            }
        }

        Ok(classification)
    }

    async fn call_model(&self, descripcion: &str) -> Result<Classification, ApiError> {
        let body = MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: 512,
            messages: vec![Message {
                role: "user",
                content: format!("{CLASSIFY_PROMPT}{descripcion}"),
            }],
        };

        let response = self
            .client
            .post(&self.config.url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Upstream(format!("Clasificador inaccesible: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(ApiError::Upstream(format!(
                "Clasificador respondió {status}"
            )));
        }

        let reply: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Upstream(format!("Respuesta ilegible: {e}")))?;

        let text = reply
            .content
            .first()
            .map(|b| b.text.as_str())
            .unwrap_or_default();

        parse_classification(text)
    }
}

/// Extracts the first JSON object from the model reply and parses it. The
/// model is asked for pure JSON but sometimes wraps it in prose.
fn parse_classification(text: &str) -> Result<Classification, ApiError> {
    let start = text.find('{');
    let end = text.rfind('}');
    let json = match (start, end) {
        (Some(s), Some(e)) if e > s => &text[s..=e],
        _ => {
            return Err(ApiError::Upstream(
                "El clasificador no devolvió JSON".to_string(),
            ))
        }
    };

    let mut classification: Classification = serde_json::from_str(json)
        .map_err(|e| ApiError::Upstream(format!("Clasificación ilegible: {e}")))?;

    // Out-of-range severities collapse to the default tier.
    if !(1..=3).contains(&classification.nivel) {
        classification.nivel = 2;
    }
    Ok(classification)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pure_json() {
        let c = parse_classification(
            r#"{"tipoAlerta":"robo_armado","nivel":3,"descripcionCorta":"Robo con arma","acciones":["Aléjate"],"llamar123":true,"llamar155":false,"confianza":0.93}"#,
        )
        .expect("should parse");
        assert_eq!(c.tipo_alerta, "robo_armado");
        assert_eq!(c.nivel, 3);
        assert!(c.llamar_123);
        assert!(!c.llamar_155);
    }

    #[test]
    fn test_parse_json_wrapped_in_prose() {
        let c = parse_classification(
            "Aquí está el análisis:\n{\"tipoAlerta\":\"salud\",\"nivel\":2,\"descripcionCorta\":\"Desmayo\"}\nEspero que ayude.",
        )
        .expect("should parse");
        assert_eq!(c.tipo_alerta, "salud");
        assert_eq!(c.descripcion_corta, "Desmayo");
        assert!(c.acciones.is_empty());
    }

    #[test]
    fn test_out_of_range_level_clamps_to_default() {
        let c = parse_classification(
            r#"{"tipoAlerta":"otro","nivel":9,"descripcionCorta":"?"}"#,
        )
        .expect("should parse");
        assert_eq!(c.nivel, 2);
    }

    #[test]
    fn test_no_json_is_upstream_error() {
        let err = parse_classification("no puedo clasificar eso").unwrap_err();
        assert!(matches!(err, ApiError::Upstream(_)));
    }
}
