//! Registered user repository.

use sqlx::PgPool;

use shared::phone::PhoneKey;

use crate::entities::PersonEntity;

/// Repository for usuarios_sos database operations.
#[derive(Clone)]
pub struct PersonRepository {
    pool: PgPool,
}

impl PersonRepository {
    /// Creates a new person repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds a registered user under either stored form of the phone number.
    pub async fn find_by_phone(
        &self,
        phone: &PhoneKey,
    ) -> Result<Option<PersonEntity>, sqlx::Error> {
        sqlx::query_as::<_, PersonEntity>(
            r#"
            SELECT * FROM usuarios_sos
            WHERE celular IN ($1, $2)
            "#,
        )
        .bind(phone.local())
        .bind(phone.prefixed())
        .fetch_optional(&self.pool)
        .await
    }

    /// Resolves a display name for a phone number, falling back to the
    /// generic placeholder when the user is unknown or has no name.
    pub async fn resolve_display_name(&self, phone: &PhoneKey) -> Result<String, sqlx::Error> {
        let person = self.find_by_phone(phone).await?;
        Ok(person
            .map(|p| match p.apellido {
                Some(apellido) if !apellido.trim().is_empty() => {
                    format!("{} {}", p.nombre, apellido)
                }
                _ => p.nombre,
            })
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| "Usuario".to_string()))
    }

    /// Blocks a user if they are not already blocked. Both stored forms of
    /// the phone are targeted so historic rows are caught. Returns the
    /// number of rows transitioned, which is zero when another writer
    /// already blocked the user.
    pub async fn block_if_unblocked(
        &self,
        phone: &PhoneKey,
        motivo: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE usuarios_sos
            SET bloqueado = TRUE, motivo_bloqueo = $3, fecha_bloqueo = NOW()
            WHERE celular IN ($1, $2) AND bloqueado = FALSE
            "#,
        )
        .bind(phone.local())
        .bind(phone.prefixed())
        .bind(motivo)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Whether the user behind this phone is blocked.
    pub async fn is_blocked(&self, phone: &PhoneKey) -> Result<bool, sqlx::Error> {
        Ok(self
            .find_by_phone(phone)
            .await?
            .map(|p| p.bloqueado)
            .unwrap_or(false))
    }
}
