use async_trait::async_trait;
use chrono::Utc;
use idiom_core::model::ProgressMap;
use sqlx::Row;
use tracing::debug;

use crate::repository::{
    PROGRESS_KEY, ProgressStore, StorageError, decode_progress, encode_progress,
};

use super::SqliteRepository;

impl SqliteRepository {
    /// Fetch the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` if the query fails.
    pub async fn get_value(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Unavailable(err.to_string()))?;

        row.map(|row| {
            row.try_get::<String, _>("value")
                .map_err(|err| StorageError::Serialization(err.to_string()))
        })
        .transpose()
    }

    /// Insert or replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` if the write fails.
    pub async fn put_value(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Unavailable(err.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl ProgressStore for SqliteRepository {
    async fn load(&self) -> Result<ProgressMap, StorageError> {
        Ok(self
            .get_value(PROGRESS_KEY)
            .await?
            .as_deref()
            .map(decode_progress)
            .unwrap_or_default())
    }

    async fn save(&self, progress: &ProgressMap) -> Result<(), StorageError> {
        let encoded = encode_progress(progress)?;
        self.put_value(PROGRESS_KEY, &encoded).await?;
        debug!(entries = progress.len(), "progress saved to sqlite");
        Ok(())
    }
}
