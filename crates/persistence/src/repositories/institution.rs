//! Institutional responder repository.

use sqlx::PgPool;

use crate::entities::InstitutionEntity;

/// Repository for cuidadores_institucionales database operations.
#[derive(Clone)]
pub struct InstitutionRepository {
    pool: PgPool,
}

impl InstitutionRepository {
    /// Creates a new institution repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds all active institutional responders that have a registered
    /// location. Rows without coordinates cannot be ranked by distance and
    /// are excluded here.
    pub async fn find_by_phone(
        &self,
        phone: &shared::phone::PhoneKey,
    ) -> Result<Option<InstitutionEntity>, sqlx::Error> {
        sqlx::query_as::<_, InstitutionEntity>(
            r#"
            SELECT * FROM cuidadores_institucionales
            WHERE celular IN ($1, $2) AND activo = TRUE
            LIMIT 1
            "#,
        )
        .bind(phone.local())
        .bind(phone.prefixed())
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn find_active_located(&self) -> Result<Vec<InstitutionEntity>, sqlx::Error> {
        sqlx::query_as::<_, InstitutionEntity>(
            r#"
            SELECT * FROM cuidadores_institucionales
            WHERE activo = TRUE
              AND latitud IS NOT NULL
              AND longitud IS NOT NULL
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}
