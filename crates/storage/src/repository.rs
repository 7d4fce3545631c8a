use async_trait::async_trait;
use idiom_core::model::ProgressMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::warn;

use crate::json_file::JsonFileProgressStore;
use crate::sqlite::SqliteInitError;

/// Name of the single application-wide slot holding the progress document.
pub const PROGRESS_KEY: &str = "flashcardProgress";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Decode a stored progress document.
///
/// A document that is not a JSON object is treated as "no data" and yields an
/// empty map. Malformed entries inside an object only blank their own card.
#[must_use]
pub fn decode_progress(raw: &str) -> ProgressMap {
    match serde_json::from_str::<ProgressMap>(raw) {
        Ok(map) => map,
        Err(err) => {
            warn!(error = %err, "stored progress is unreadable, starting from empty progress");
            ProgressMap::new()
        }
    }
}

/// Encode the full progress map as one JSON object.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn encode_progress(progress: &ProgressMap) -> Result<String, StorageError> {
    serde_json::to_string(progress).map_err(|err| StorageError::Serialization(err.to_string()))
}

/// Persistence contract for learning progress.
///
/// Backends store the whole map in a single slot; every save overwrites it.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Read the persisted progress.
    ///
    /// Missing or unparsable state is returned as an empty map.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only if the backend itself cannot be reached.
    async fn load(&self) -> Result<ProgressMap, StorageError>;

    /// Replace the persisted progress with `progress`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write does not complete.
    async fn save(&self, progress: &ProgressMap) -> Result<(), StorageError>;
}

/// Simple in-memory store for testing and prototyping.
///
/// Keeps the encoded document rather than the map so reads go through the
/// same decoding path as the persistent backends.
#[derive(Clone, Default)]
pub struct InMemoryProgressStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl InMemoryProgressStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with a raw document, valid or not.
    #[must_use]
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(raw.into()))),
        }
    }

    /// The raw document as last written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` if the slot lock is poisoned.
    pub fn raw(&self) -> Result<Option<String>, StorageError> {
        let guard = self
            .slot
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(guard.clone())
    }
}

#[async_trait]
impl ProgressStore for InMemoryProgressStore {
    async fn load(&self) -> Result<ProgressMap, StorageError> {
        Ok(self.raw()?.as_deref().map(decode_progress).unwrap_or_default())
    }

    async fn save(&self, progress: &ProgressMap) -> Result<(), StorageError> {
        let encoded = encode_progress(progress)?;
        let mut guard = self
            .slot
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        *guard = Some(encoded);
        Ok(())
    }
}

/// Progress store behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            progress: Arc::new(InMemoryProgressStore::new()),
        }
    }

    #[must_use]
    pub fn json_file(path: impl Into<PathBuf>) -> Self {
        Self {
            progress: Arc::new(JsonFileProgressStore::new(path)),
        }
    }

    /// Open the backend named by `target`.
    ///
    /// `sqlite:` URLs select the `SQLite` store; anything else is a JSON file path.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the `SQLite` backend cannot be opened.
    pub async fn open(target: &str) -> Result<Self, SqliteInitError> {
        if target.starts_with("sqlite:") {
            Self::sqlite(target).await
        } else {
            Ok(Self::json_file(target))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use idiom_core::model::CardId;

    #[tokio::test]
    async fn empty_store_loads_empty_map() {
        let store = InMemoryProgressStore::new();
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_overwrites_previous_document() {
        let store = InMemoryProgressStore::new();
        let mut progress = ProgressMap::new();
        progress.set_due_date(&CardId::from(1), NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        store.save(&progress).await.unwrap();

        progress.set_due_date(&CardId::from(1), NaiveDate::from_ymd_opt(2024, 1, 9).unwrap());
        store.save(&progress).await.unwrap();

        assert_eq!(
            store.raw().unwrap().as_deref(),
            Some(r#"{"1":{"dueDate":"2024-01-09"}}"#)
        );
        assert_eq!(store.load().await.unwrap(), progress);
    }

    #[tokio::test]
    async fn garbage_document_loads_as_empty() {
        for raw in ["", "not json", "[1,2,3]", "null", "\"2024-01-01\""] {
            let store = InMemoryProgressStore::with_raw(raw);
            assert!(store.load().await.unwrap().is_empty(), "raw: {raw}");
        }
    }

    #[tokio::test]
    async fn malformed_entry_keeps_other_cards() {
        let store = InMemoryProgressStore::with_raw(r#"{"1":"2024-01-01","2":{"dueDate":"2024-01-03"}}"#);
        let progress = store.load().await.unwrap();

        assert_eq!(progress.len(), 2);
        assert_eq!(progress.due_date(&CardId::from(1)), None);
        assert_eq!(
            progress.due_date(&CardId::from(2)),
            NaiveDate::from_ymd_opt(2024, 1, 3)
        );
    }

    #[tokio::test]
    async fn open_treats_plain_paths_as_json_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");
        let storage = Storage::open(path.to_str().unwrap()).await.unwrap();
        assert!(storage.progress.load().await.unwrap().is_empty());
    }
}
