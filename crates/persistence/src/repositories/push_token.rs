//! FCM push token repository.

use sqlx::PgPool;

use shared::phone::PhoneKey;

use crate::entities::PushTokenEntity;

/// Repository for tokens_fcm database operations.
#[derive(Clone)]
pub struct PushTokenRepository {
    pool: PgPool,
}

impl PushTokenRepository {
    /// Creates a new push token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds the most recent valid token for either stored form of the
    /// phone number.
    pub async fn find_latest_valid(
        &self,
        phone: &PhoneKey,
    ) -> Result<Option<PushTokenEntity>, sqlx::Error> {
        sqlx::query_as::<_, PushTokenEntity>(
            r#"
            SELECT * FROM tokens_fcm
            WHERE celular IN ($1, $2) AND valido = TRUE
            ORDER BY fecha DESC
            LIMIT 1
            "#,
        )
        .bind(phone.local())
        .bind(phone.prefixed())
        .fetch_optional(&self.pool)
        .await
    }

    /// Registers a fresh token for a phone, invalidating earlier tokens so
    /// there is at most one valid token per device.
    pub async fn register(
        &self,
        phone: &PhoneKey,
        id_persona: Option<i32>,
        token: &str,
    ) -> Result<PushTokenEntity, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            UPDATE tokens_fcm
            SET valido = FALSE
            WHERE celular IN ($1, $2) AND valido = TRUE
            "#,
        )
        .bind(phone.local())
        .bind(phone.prefixed())
        .execute(&mut *tx)
        .await?;
        let entity = sqlx::query_as::<_, PushTokenEntity>(
            r#"
            INSERT INTO tokens_fcm (celular, id_persona, token)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(phone.prefixed())
        .bind(id_persona)
        .bind(token)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(entity)
    }

    /// Invalidates every valid token that matches the given token string.
    /// Called when the push provider reports the address as unregistered.
    pub async fn invalidate_token(&self, token: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE tokens_fcm
            SET valido = FALSE
            WHERE token = $1 AND valido = TRUE
            "#,
        )
        .bind(token)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
