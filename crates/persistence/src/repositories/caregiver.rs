//! Authorized caregiver repository.

use sqlx::PgPool;

use shared::phone::PhoneKey;

use crate::entities::CaregiverEntity;

/// Repository for cuidadores_autorizados database operations.
#[derive(Clone)]
pub struct CaregiverRepository {
    pool: PgPool,
}

impl CaregiverRepository {
    /// Creates a new caregiver repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds the active caregivers watching over the given phone. Both
    /// stored forms of the watched phone are matched.
    pub async fn find_for_watched(
        &self,
        watched: &PhoneKey,
    ) -> Result<Vec<CaregiverEntity>, sqlx::Error> {
        sqlx::query_as::<_, CaregiverEntity>(
            r#"
            SELECT * FROM cuidadores_autorizados
            WHERE celular_cuidado IN ($1, $2) AND activo = TRUE
            ORDER BY id
            "#,
        )
        .bind(watched.local())
        .bind(watched.prefixed())
        .fetch_all(&self.pool)
        .await
    }
}
