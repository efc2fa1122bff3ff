//! User report repository.

use sqlx::PgPool;

use shared::phone::PhoneKey;

use crate::entities::ReportEntity;

/// Repository for reportes_usuario database operations.
#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    /// Creates a new report repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a report. The unique (reportado, reporta) constraint rejects
    /// a duplicate report from the same reporter with a 23505 violation.
    pub async fn create(
        &self,
        celular_reportado: &str,
        celular_reporta: &str,
        motivo: &str,
        descripcion: Option<&str>,
    ) -> Result<ReportEntity, sqlx::Error> {
        sqlx::query_as::<_, ReportEntity>(
            r#"
            INSERT INTO reportes_usuario (
                celular_reportado,
                celular_reporta,
                motivo,
                descripcion
            )
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(celular_reportado)
        .bind(celular_reporta)
        .bind(motivo)
        .bind(descripcion)
        .fetch_one(&self.pool)
        .await
    }

    /// Counts distinct reports filed against either stored form of the
    /// reported phone.
    pub async fn count_against(&self, reported: &PhoneKey) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM reportes_usuario
            WHERE celular_reportado IN ($1, $2)
            "#,
        )
        .bind(reported.local())
        .bind(reported.prefixed())
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }
}
