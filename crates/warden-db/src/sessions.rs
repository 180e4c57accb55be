use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use warden_auth::{AuthError, SessionStore};

use crate::parse_user_id;

fn store_error(err: sqlx::Error) -> AuthError {
    AuthError::Store(err.into())
}

/// Session records in the `sessions` table.
#[derive(Clone, Debug)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    #[instrument(skip(self))]
    async fn create_session(
        &self,
        user_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let user_id = parse_user_id(user_id)
            .ok_or_else(|| AuthError::UnknownUser(user_id.to_string()))?;
        let session_id = Uuid::new_v4();

        sqlx::query("INSERT INTO sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(session_id.to_string())
    }

    async fn is_active(&self, session_id: &str) -> Result<bool, AuthError> {
        let Ok(session_id) = Uuid::parse_str(session_id) else {
            return Ok(false);
        };

        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM sessions WHERE id = $1 AND expires_at > now())",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)
    }

    #[instrument(skip(self))]
    async fn delete_session(&self, session_id: &str) -> Result<(), AuthError> {
        let Ok(session_id) = Uuid::parse_str(session_id) else {
            return Ok(());
        };

        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_all_sessions(&self, user_id: &str) -> Result<u64, AuthError> {
        let Some(user_id) = parse_user_id(user_id) else {
            return Ok(0);
        };

        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(result.rows_affected())
    }
}
