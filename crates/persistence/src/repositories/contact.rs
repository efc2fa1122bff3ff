//! Trusted contact repository.

use sqlx::PgPool;

use shared::phone::PhoneKey;

use crate::entities::ContactEntity;

/// Repository for contactos_confianza database operations.
#[derive(Clone)]
pub struct ContactRepository {
    pool: PgPool,
}

impl ContactRepository {
    /// Creates a new contact repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds the active emergency contacts registered by the user behind
    /// the given phone. Both stored forms of the owner phone are matched.
    pub async fn find_emergency_contacts(
        &self,
        owner: &PhoneKey,
    ) -> Result<Vec<ContactEntity>, sqlx::Error> {
        sqlx::query_as::<_, ContactEntity>(
            r#"
            SELECT c.* FROM contactos_confianza c
            JOIN usuarios_sos u ON u.id = c.usuario_id
            WHERE u.celular IN ($1, $2)
              AND c.activo = TRUE
              AND c.disponible_emergencias = TRUE
            ORDER BY c.id
            "#,
        )
        .bind(owner.local())
        .bind(owner.prefixed())
        .fetch_all(&self.pool)
        .await
    }
}
