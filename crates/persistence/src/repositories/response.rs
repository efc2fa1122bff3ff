//! Institutional response repository.

use sqlx::PgPool;

use crate::entities::ResponseEntity;

/// Repository for respuestas_institucionales database operations.
#[derive(Clone)]
pub struct ResponseRepository {
    pool: PgPool,
}

impl ResponseRepository {
    /// Creates a new response repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a responder's answer to an alert. The unique
    /// (alerta_id, celular) constraint rejects a second answer from the
    /// same responder with a 23505 violation.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        alerta_id: i64,
        id_persona: i32,
        celular: &str,
        nombre: &str,
        entidad: Option<&str>,
        accion: &str,
        latitud: Option<f64>,
        longitud: Option<f64>,
        tiempo_estimado_min: Option<i32>,
    ) -> Result<ResponseEntity, sqlx::Error> {
        sqlx::query_as::<_, ResponseEntity>(
            r#"
            INSERT INTO respuestas_institucionales (
                alerta_id,
                id_persona,
                celular,
                nombre,
                entidad,
                accion,
                latitud,
                longitud,
                tiempo_estimado_min
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(alerta_id)
        .bind(id_persona)
        .bind(celular)
        .bind(nombre)
        .bind(entidad)
        .bind(accion)
        .bind(latitud)
        .bind(longitud)
        .bind(tiempo_estimado_min)
        .fetch_one(&self.pool)
        .await
    }

    /// Lists the responses recorded for an alert, oldest first.
    pub async fn find_by_alert(&self, alerta_id: i64) -> Result<Vec<ResponseEntity>, sqlx::Error> {
        sqlx::query_as::<_, ResponseEntity>(
            r#"
            SELECT * FROM respuestas_institucionales
            WHERE alerta_id = $1
            ORDER BY fecha_respuesta
            "#,
        )
        .bind(alerta_id)
        .fetch_all(&self.pool)
        .await
    }
}
