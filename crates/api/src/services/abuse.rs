//! User reports and the abuse-blocking threshold.
//!
//! Three distinct reports against a person block their account exactly
//! once: the flag flip is a compare-and-swap on `bloqueado = FALSE`, so
//! the fourth report can never re-block or double-count.

use sqlx::PgPool;
use tracing::{info, warn};

use domain::models::report::{ReportPersonRequest, ReportPersonResponse, BLOCK_THRESHOLD};
use persistence::repositories::{LocationPingRepository, PersonRepository, ReportRepository};
use shared::phone::PhoneKey;

use crate::error::ApiError;
use crate::middleware::metrics::record_user_blocked;

/// Handles person reports and the block threshold.
#[derive(Clone)]
pub struct AbuseEngine {
    reports: ReportRepository,
    persons: PersonRepository,
    pings: LocationPingRepository,
}

impl AbuseEngine {
    pub fn new(pool: PgPool) -> Self {
        Self {
            reports: ReportRepository::new(pool.clone()),
            persons: PersonRepository::new(pool.clone()),
            pings: LocationPingRepository::new(pool),
        }
    }

    /// Records a report against a person. Self-reports and duplicate
    /// (reported, reporter) pairs are conflicts. At the threshold the
    /// reported person is blocked and withdrawn from the community
    /// network.
    pub async fn report(&self, req: ReportPersonRequest) -> Result<ReportPersonResponse, ApiError> {
        let reported = PhoneKey::parse(&req.celular_reportado)?;
        let reporter = PhoneKey::parse(&req.celular_reporta)?;

        if reported.matches(reporter.local()) {
            return Err(ApiError::Conflict(
                "No puedes reportarte a ti mismo".to_string(),
            ));
        }

        self.reports
            .create(
                reported.prefixed(),
                reporter.prefixed(),
                &req.motivo,
                req.descripcion.as_deref(),
            )
            .await
            .map_err(|e| match ApiError::from(e) {
                ApiError::Conflict(_) => {
                    ApiError::Conflict("Ya reportaste a esta persona".to_string())
                }
                other => other,
            })?;

        let total_reportes = self.reports.count_against(&reported).await?;

        let mut bloqueado = self.persons.is_blocked(&reported).await?;

        if total_reportes >= BLOCK_THRESHOLD && !bloqueado {
            let motivo = format!("{} reportes de la comunidad", total_reportes);
            let transitioned = self.persons.block_if_unblocked(&reported, &motivo).await?;
            if transitioned > 0 {
                record_user_blocked();
                info!(celular = %reported, total_reportes, "User blocked by report threshold");
                if let Err(e) = self.pings.mark_unavailable(&reported).await {
                    warn!("Failed to withdraw blocked user from network: {}", e);
                }
            }
            // Either this call blocked them or a concurrent one already had.
            bloqueado = true;
        }

        Ok(ReportPersonResponse {
            success: true,
            total_reportes,
            bloqueado,
        })
    }
}
