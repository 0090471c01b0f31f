//! File-backed action store.
//!
//! The slot is a single JSON file. Writes go to a sibling temp file which is
//! synced and then renamed over the slot, so a failed write leaves the
//! previous list in place.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::{decode_slot, encode_slot, ActionStore};
use crate::shared::{ActionRecord, StoreError};

/// Action store persisted as a JSON file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Use `path` as the slot file, creating its parent directory if needed
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "offline_queue".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl ActionStore for FileStore {
    async fn read_all(&self) -> Result<Vec<ActionRecord>, StoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(decode_slot(&raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                tracing::warn!(path = %self.path.display(), "Offline queue file is not UTF-8, treating as empty");
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write_all(&self, records: &[ActionRecord]) -> Result<(), StoreError> {
        let raw = encode_slot(records)?;
        let temp_path = self.temp_path();

        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(raw.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &self.path).await?;
        tracing::trace!(path = %self.path.display(), count = records.len(), "Wrote offline queue file");
        Ok(())
    }
}
