//! Community network location repository.

use chrono::{Duration, Utc};
use sqlx::PgPool;

use shared::phone::PhoneKey;

use crate::entities::LocationPingEntity;

/// Repository for ubicaciones_red database operations.
#[derive(Clone)]
pub struct LocationPingRepository {
    pool: PgPool,
}

impl LocationPingRepository {
    /// Creates a new location ping repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upserts the last known location for a community member. One row per
    /// phone; repeated pings refresh it in place.
    pub async fn upsert(
        &self,
        phone: &PhoneKey,
        id_persona: Option<i32>,
        nombre: Option<&str>,
        latitud: f64,
        longitud: f64,
        disponible: bool,
    ) -> Result<LocationPingEntity, sqlx::Error> {
        sqlx::query_as::<_, LocationPingEntity>(
            r#"
            INSERT INTO ubicaciones_red (
                celular,
                id_persona,
                nombre,
                latitud,
                longitud,
                disponible
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (celular) DO UPDATE SET
                id_persona = EXCLUDED.id_persona,
                nombre = EXCLUDED.nombre,
                latitud = EXCLUDED.latitud,
                longitud = EXCLUDED.longitud,
                disponible = EXCLUDED.disponible,
                actualizado_at = NOW()
            RETURNING *
            "#,
        )
        .bind(phone.prefixed())
        .bind(id_persona)
        .bind(nombre)
        .bind(latitud)
        .bind(longitud)
        .bind(disponible)
        .fetch_one(&self.pool)
        .await
    }

    /// Finds fresh, available community members whose owning account is
    /// not blocked, excluding the alert source. Freshness is bounded by
    /// the caller-supplied window.
    pub async fn find_fresh_candidates(
        &self,
        exclude: &PhoneKey,
        freshness_minutes: i64,
    ) -> Result<Vec<LocationPingEntity>, sqlx::Error> {
        let cutoff = Utc::now() - Duration::minutes(freshness_minutes);
        sqlx::query_as::<_, LocationPingEntity>(
            r#"
            SELECT r.* FROM ubicaciones_red r
            LEFT JOIN usuarios_sos u ON u.celular = r.celular
            WHERE r.disponible = TRUE
              AND r.actualizado_at >= $1
              AND r.celular NOT IN ($2, $3)
              AND COALESCE(u.bloqueado, FALSE) = FALSE
            "#,
        )
        .bind(cutoff)
        .bind(exclude.local())
        .bind(exclude.prefixed())
        .fetch_all(&self.pool)
        .await
    }

    /// Withdraws a member from the community network. Used when the owning
    /// account gets blocked.
    pub async fn mark_unavailable(&self, phone: &PhoneKey) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE ubicaciones_red
            SET disponible = FALSE
            WHERE celular IN ($1, $2)
            "#,
        )
        .bind(phone.local())
        .bind(phone.prefixed())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
