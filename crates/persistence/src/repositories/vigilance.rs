//! Vigilance repository.
//!
//! Quorum escalation uses a compare-and-swap on the estado column so that
//! concurrent confirmations elect exactly one winner.

use sqlx::PgPool;

use crate::entities::{ConfirmationEntity, VigilanceEntity};

/// Repository for vigilancias database operations.
#[derive(Clone)]
pub struct VigilanceRepository {
    pool: PgPool,
}

impl VigilanceRepository {
    /// Creates a new vigilance repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new vigilance in the active state.
    pub async fn create(
        &self,
        celular: &str,
        nombre: Option<&str>,
        descripcion: &str,
        tipo_sospecha: &str,
        latitud: f64,
        longitud: f64,
    ) -> Result<VigilanceEntity, sqlx::Error> {
        sqlx::query_as::<_, VigilanceEntity>(
            r#"
            INSERT INTO vigilancias (
                celular,
                nombre,
                descripcion,
                tipo_sospecha,
                latitud,
                longitud
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(celular)
        .bind(nombre)
        .bind(descripcion)
        .bind(tipo_sospecha)
        .bind(latitud)
        .bind(longitud)
        .fetch_one(&self.pool)
        .await
    }

    /// Finds a vigilance by id.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<VigilanceEntity>, sqlx::Error> {
        sqlx::query_as::<_, VigilanceEntity>(
            r#"
            SELECT * FROM vigilancias
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Records one confirmer's vote. The unique (vigilancia_id, celular)
    /// constraint rejects a second vote from the same phone with a 23505
    /// violation.
    pub async fn add_confirmation(
        &self,
        vigilancia_id: i64,
        celular: &str,
        confirma: bool,
        comentario: Option<&str>,
        latitud: Option<f64>,
        longitud: Option<f64>,
    ) -> Result<ConfirmationEntity, sqlx::Error> {
        sqlx::query_as::<_, ConfirmationEntity>(
            r#"
            INSERT INTO confirmaciones_vigilancia (
                vigilancia_id,
                celular,
                confirma,
                comentario,
                latitud,
                longitud
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(vigilancia_id)
        .bind(celular)
        .bind(confirma)
        .bind(comentario)
        .bind(latitud)
        .bind(longitud)
        .fetch_one(&self.pool)
        .await
    }

    /// Bumps the vote counters and returns the updated row.
    pub async fn increment_votes(
        &self,
        id: i64,
        confirma: bool,
    ) -> Result<VigilanceEntity, sqlx::Error> {
        if confirma {
            sqlx::query_as::<_, VigilanceEntity>(
                r#"
                UPDATE vigilancias
                SET confirmaciones = confirmaciones + 1
                WHERE id = $1
                RETURNING *
                "#,
            )
            .bind(id)
            .fetch_one(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, VigilanceEntity>(
                r#"
                UPDATE vigilancias
                SET rechazos = rechazos + 1
                WHERE id = $1
                RETURNING *
                "#,
            )
            .bind(id)
            .fetch_one(&self.pool)
            .await
        }
    }

    /// Transitions an active vigilance to escalated. Returns true only for
    /// the caller that performed the transition; concurrent callers see
    /// zero rows affected and back off.
    pub async fn escalate_if_active(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE vigilancias
            SET estado = 'escalada'
            WHERE id = $1 AND estado = 'activa'
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Links the escalated vigilance to the alert it produced.
    pub async fn link_alert(&self, id: i64, alerta_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE vigilancias
            SET alerta_id = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(alerta_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
