//! Panic alert repository.

use chrono::{Duration, Utc};
use sqlx::PgPool;

use shared::phone::PhoneKey;

use crate::entities::AlertEntity;

/// Repository for alertas_panico database operations.
#[derive(Clone)]
pub struct AlertRepository {
    pool: PgPool,
}

impl AlertRepository {
    /// Creates a new alert repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new alert and returns the stored row.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        celular: &str,
        nombre: &str,
        mensaje: &str,
        tipo_alerta: &str,
        nivel_emergencia: i16,
        latitud: Option<f64>,
        longitud: Option<f64>,
        fuente_alerta: &str,
        bateria_dispositivo: Option<i32>,
    ) -> Result<AlertEntity, sqlx::Error> {
        sqlx::query_as::<_, AlertEntity>(
            r#"
            INSERT INTO alertas_panico (
                celular,
                nombre,
                mensaje,
                tipo_alerta,
                nivel_emergencia,
                latitud,
                longitud,
                fuente_alerta,
                bateria_dispositivo
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(celular)
        .bind(nombre)
        .bind(mensaje)
        .bind(tipo_alerta)
        .bind(nivel_emergencia)
        .bind(latitud)
        .bind(longitud)
        .bind(fuente_alerta)
        .bind(bateria_dispositivo)
        .fetch_one(&self.pool)
        .await
    }

    /// Finds an alert by id.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<AlertEntity>, sqlx::Error> {
        sqlx::query_as::<_, AlertEntity>(
            r#"
            SELECT * FROM alertas_panico
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Finds the most recent relayed alert from the same source within the
    /// deduplication window, if any.
    pub async fn find_recent_relay(
        &self,
        source: &PhoneKey,
        window_minutes: i64,
    ) -> Result<Option<AlertEntity>, sqlx::Error> {
        let cutoff = Utc::now() - Duration::minutes(window_minutes);
        sqlx::query_as::<_, AlertEntity>(
            r#"
            SELECT * FROM alertas_panico
            WHERE celular IN ($1, $2)
              AND fuente_alerta = 'relay'
              AND fecha_hora >= $3
            ORDER BY fecha_hora DESC
            LIMIT 1
            "#,
        )
        .bind(source.local())
        .bind(source.prefixed())
        .bind(cutoff)
        .fetch_optional(&self.pool)
        .await
    }

    /// Marks an alert as attended. The first institutional response flips
    /// this flag.
    pub async fn mark_handled(&self, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE alertas_panico
            SET atendida = TRUE
            WHERE id = $1 AND atendida = FALSE
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Appends a classification note to the stored alert message.
    pub async fn append_analysis(&self, id: i64, analysis: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE alertas_panico
            SET mensaje = mensaje || $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(format!("\n[Análisis] {analysis}"))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
