use async_trait::async_trait;
use idiom_core::model::ProgressMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

use crate::repository::{ProgressStore, StorageError, decode_progress, encode_progress};

/// Progress kept as a single JSON document on disk.
///
/// Saves write a sibling temp file and rename it over the target, so readers
/// only ever see a complete document.
#[derive(Debug, Clone)]
pub struct JsonFileProgressStore {
    path: PathBuf,
}

impl JsonFileProgressStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl ProgressStore for JsonFileProgressStore {
    async fn load(&self) -> Result<ProgressMap, StorageError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(decode_progress(&raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no progress file yet");
                Ok(ProgressMap::new())
            }
            // Non-UTF-8 content is just another unparsable document.
            Err(err) if err.kind() == ErrorKind::InvalidData => Ok(decode_progress("")),
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, progress: &ProgressMap) -> Result<(), StorageError> {
        let encoded = encode_progress(progress)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let temp = self.temp_path();
        tokio::fs::write(&temp, encoded).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        debug!(path = %self.path.display(), entries = progress.len(), "progress saved");
        Ok(())
    }
}
