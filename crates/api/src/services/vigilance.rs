//! Preventive vigilance reports and quorum escalation.
//!
//! A vigilance is a "something looks off" report that does not page anyone
//! by itself. When enough distinct neighbors confirm it, it escalates into
//! a real security alert exactly once: the state transition is a
//! compare-and-swap, and only the caller that wins it creates the alert.

use sqlx::PgPool;
use tracing::{info, warn};

use domain::models::vigilance::{
    ConfirmVigilanceRequest, ConfirmVigilanceResponse, CreateVigilanceRequest, Vigilance,
    VigilanceState, CONFIRMATION_QUORUM,
};
use domain::models::{AlertChannel, SubmitAlertRequest};
use persistence::repositories::VigilanceRepository;
use shared::phone::PhoneKey;

use crate::error::ApiError;
use crate::middleware::metrics::record_vigilance_escalated;
use crate::services::alert_engine::AlertEngine;

/// Creates vigilances and runs the confirmation quorum.
#[derive(Clone)]
pub struct VigilanceEngine {
    vigilances: VigilanceRepository,
    alert_engine: AlertEngine,
}

impl VigilanceEngine {
    pub fn new(pool: PgPool, alert_engine: AlertEngine) -> Self {
        Self {
            vigilances: VigilanceRepository::new(pool),
            alert_engine,
        }
    }

    /// Records a new vigilance in the active state.
    pub async fn create(&self, req: CreateVigilanceRequest) -> Result<Vigilance, ApiError> {
        let creator = PhoneKey::parse(&req.celular)?;
        let entity = self
            .vigilances
            .create(
                creator.prefixed(),
                req.nombre.as_deref(),
                &req.descripcion,
                &req.tipo_sospecha,
                req.latitud,
                req.longitud,
            )
            .await?;
        Ok(Vigilance::from(entity))
    }

    /// Records one confirmation or rejection, and escalates on quorum.
    ///
    /// Confirmations are unique per phone; a duplicate vote is a 409. When
    /// the confirmation count reaches the quorum the escalation CAS runs:
    /// the single winner creates a tier-2 security alert through the alert
    /// engine and links it back. Everyone else observes the escalated
    /// state and does nothing.
    pub async fn confirm(
        &self,
        req: ConfirmVigilanceRequest,
    ) -> Result<ConfirmVigilanceResponse, ApiError> {
        let confirmer = PhoneKey::parse(&req.celular)?;

        let vigilance = self
            .vigilances
            .find_by_id(req.vigilancia_id)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Vigilancia {} no existe", req.vigilancia_id))
            })?;

        if confirmer.matches(&vigilance.celular) {
            return Err(ApiError::Conflict(
                "No puedes confirmar tu propia vigilancia".to_string(),
            ));
        }

        self.vigilances
            .add_confirmation(
                req.vigilancia_id,
                confirmer.prefixed(),
                req.confirma,
                req.comentario.as_deref(),
                req.latitud,
                req.longitud,
            )
            .await
            .map_err(|e| match ApiError::from(e) {
                ApiError::Conflict(_) => {
                    ApiError::Conflict("Ya votaste en esta vigilancia".to_string())
                }
                other => other,
            })?;

        let updated = self
            .vigilances
            .increment_votes(req.vigilancia_id, req.confirma)
            .await?;

        let mut escalada = false;
        let mut alerta_id = updated.alerta_id;

        if req.confirma && updated.confirmaciones >= CONFIRMATION_QUORUM {
            if self.vigilances.escalate_if_active(req.vigilancia_id).await? {
                escalada = true;
                alerta_id = self.escalate(&updated).await;
            } else if let Some(current) = self.vigilances.find_by_id(req.vigilancia_id).await? {
                // Lost the swap: either a concurrent confirmer escalated
                // first or the vigilance was closed meanwhile. Report what
                // the row says rather than assuming.
                escalada = lost_swap_escalated(&current.estado);
                alerta_id = current.alerta_id;
            }
        }

        Ok(ConfirmVigilanceResponse {
            success: true,
            confirmaciones: updated.confirmaciones,
            rechazos: updated.rechazos,
            escalada,
            alerta_id,
        })
    }

    /// Creates the escalation alert on behalf of the vigilance creator and
    /// links it back. Best-effort: a failure leaves the vigilance in the
    /// escalated state without a linked alert.
    async fn escalate(&self, vigilance: &persistence::entities::VigilanceEntity) -> Option<i64> {
        record_vigilance_escalated();
        info!(vigilancia_id = vigilance.id, "Vigilance reached quorum, escalating");

        let mensaje = format!(
            "Vigilancia comunitaria confirmada por {} testigos: {}",
            vigilance.confirmaciones, vigilance.descripcion
        );

        let submission = SubmitAlertRequest {
            celular: vigilance.celular.clone(),
            nombre: vigilance.nombre.clone(),
            tipo_alerta: "seguridad".to_string(),
            nivel: Some(2),
            mensaje: Some(mensaje),
            latitud: Some(vigilance.latitud),
            longitud: Some(vigilance.longitud),
            fuente_alerta: Some(AlertChannel::App),
            bateria_dispositivo: None,
        };

        match self.alert_engine.submit(submission).await {
            Ok(ack) => {
                if let Err(e) = self.vigilances.link_alert(vigilance.id, ack.alerta_id).await {
                    warn!(
                        vigilancia_id = vigilance.id,
                        "Failed to link escalation alert: {}", e
                    );
                }
                Some(ack.alerta_id)
            }
            Err(e) => {
                warn!(
                    vigilancia_id = vigilance.id,
                    "Escalation alert failed: {}", e
                );
                None
            }
        }
    }
}

/// Whether a vigilance that lost the escalation swap is actually in the
/// escalated state. The swap also fails when the row was closed.
fn lost_swap_escalated(estado: &str) -> bool {
    VigilanceState::parse(estado) == VigilanceState::Escalada
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lost_swap_against_escalated_row() {
        assert!(lost_swap_escalated("escalada"));
    }

    #[test]
    fn test_lost_swap_against_closed_row_is_not_escalated() {
        assert!(!lost_swap_escalated("cerrada"));
        assert!(!lost_swap_escalated("activa"));
    }
}
