//! FCM push token entity (tokens_fcm row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the tokens_fcm table.
#[derive(Debug, Clone, FromRow)]
pub struct PushTokenEntity {
    pub id: i64,
    pub celular: String,
    pub id_persona: Option<i32>,
    pub token: String,
    pub valido: bool,
    pub fecha: DateTime<Utc>,
}
