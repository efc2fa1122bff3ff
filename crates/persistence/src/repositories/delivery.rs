//! Delivery record repository.

use sqlx::PgPool;

use domain::models::DeliverySummary;

use crate::entities::DeliveryEntity;

/// Repository for alertas_enviadas database operations.
#[derive(Clone)]
pub struct DeliveryRepository {
    pool: PgPool,
}

impl DeliveryRepository {
    /// Creates a new delivery repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Records a delivery attempt. The unique (alerta_id, destinatario)
    /// constraint makes retries idempotent; a conflicting insert is a
    /// no-op and returns None.
    #[allow(clippy::too_many_arguments)]
    pub async fn record(
        &self,
        alerta_id: i64,
        celular_destinatario: &str,
        nombre_destinatario: &str,
        token: &str,
        mensaje: &str,
        estado_envio: &str,
        rol_destinatario: &str,
        entidad: Option<&str>,
    ) -> Result<Option<DeliveryEntity>, sqlx::Error> {
        sqlx::query_as::<_, DeliveryEntity>(
            r#"
            INSERT INTO alertas_enviadas (
                alerta_id,
                celular_destinatario,
                nombre_destinatario,
                token,
                mensaje,
                estado_envio,
                rol_destinatario,
                entidad
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (alerta_id, celular_destinatario) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(alerta_id)
        .bind(celular_destinatario)
        .bind(nombre_destinatario)
        .bind(token)
        .bind(mensaje)
        .bind(estado_envio)
        .bind(rol_destinatario)
        .bind(entidad)
        .fetch_optional(&self.pool)
        .await
    }

    /// Lists the delivery records for an alert.
    pub async fn find_by_alert(&self, alerta_id: i64) -> Result<Vec<DeliveryEntity>, sqlx::Error> {
        sqlx::query_as::<_, DeliveryEntity>(
            r#"
            SELECT * FROM alertas_enviadas
            WHERE alerta_id = $1
            ORDER BY id
            "#,
        )
        .bind(alerta_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Totals delivery attempts and successes for an alert.
    pub async fn summarize(&self, alerta_id: i64) -> Result<DeliverySummary, sqlx::Error> {
        let row: (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE estado_envio = 'enviado')
            FROM alertas_enviadas
            WHERE alerta_id = $1
            "#,
        )
        .bind(alerta_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(DeliverySummary {
            total: row.0,
            enviadas: row.1,
        })
    }
}
