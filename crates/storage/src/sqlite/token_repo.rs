use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;

use crate::repository::{StorageError, StoredToken, TokenStore};

use super::SqliteRepository;

#[async_trait]
impl TokenStore for SqliteRepository {
    async fn load_token(&self) -> Result<Option<StoredToken>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT token, saved_at
            FROM auth_session
            WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let token: String = row
            .try_get("token")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let saved_at: DateTime<Utc> = row
            .try_get("saved_at")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        Ok(Some(StoredToken { token, saved_at }))
    }

    async fn save_token(&self, token: &str, saved_at: DateTime<Utc>) -> Result<(), StorageError> {
        if token.trim().is_empty() {
            return Err(StorageError::Serialization("empty token".into()));
        }

        sqlx::query(
            r"
            INSERT INTO auth_session (id, token, saved_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                token = excluded.token,
                saved_at = excluded.saved_at
            ",
        )
        .bind(1_i64)
        .bind(token)
        .bind(saved_at)
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }

    async fn clear_token(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM auth_session WHERE id = 1")
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }
}
