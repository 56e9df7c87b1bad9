//! JSON-file backed store.
//!
//! All keys live in one JSON object at `<dir>/session.json`. Writes go to a
//! sibling temp file and are renamed into place, so a crash mid-write leaves
//! the previous contents intact. A mutex serializes read-modify-write cycles
//! within the process.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::{KeyValueStore, StorageError};

const FILE_NAME: &str = "session.json";

type Items = BTreeMap<String, String>;

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { path: dir.into().join(FILE_NAME), lock: Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_items(&self) -> Result<Items, StorageError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) if text.trim().is_empty() => Ok(Items::new()),
            Ok(text) => serde_json::from_str(&text).map_err(|e| StorageError::Corrupt(e.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Items::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Read for modification. Unreadable contents are discarded rather than
    /// blocking every future write.
    async fn read_items_for_write(&self) -> Result<Items, StorageError> {
        match self.read_items().await {
            Err(StorageError::Corrupt(reason)) => {
                tracing::warn!(path = %self.path.display(), %reason, "discarding corrupt store contents");
                Ok(Items::new())
            }
            other => other,
        }
    }

    async fn write_items(&self, items: &Items) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let text = serde_json::to_string_pretty(items).map_err(|e| StorageError::Corrupt(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        let result = match write_private(&tmp, text.as_bytes()).await {
            Ok(()) => tokio::fs::rename(&tmp, &self.path).await.map_err(StorageError::from),
            Err(e) => Err(e),
        };
        if result.is_err() {
            let _ = tokio::fs::remove_file(&tmp).await;
        }
        result
    }
}

/// Create `path` fresh and write `bytes`. On unix the file is owner-only from
/// the moment it exists.
async fn write_private(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    match tokio::fs::remove_file(path).await {
        Err(e) if e.kind() != ErrorKind::NotFound => return Err(e.into()),
        _ => {}
    }
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);
    let mut file = options.open(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    Ok(())
}

#[async_trait::async_trait]
impl KeyValueStore for FileStore {
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut items = self.read_items_for_write().await?;
        items.insert(key.to_owned(), value.to_owned());
        self.write_items(&items).await
    }

    async fn multi_get(&self, keys: &[&str]) -> Result<Vec<(String, Option<String>)>, StorageError> {
        let _guard = self.lock.lock().await;
        let items = self.read_items().await?;
        Ok(keys.iter().map(|k| ((*k).to_owned(), items.get(*k).cloned())).collect())
    }

    async fn multi_remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut items = self.read_items_for_write().await?;
        let before = items.len();
        for key in keys {
            items.remove(*key);
        }
        if items.is_empty() {
            return match tokio::fs::remove_file(&self.path).await {
                Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            };
        }
        if items.len() == before {
            return Ok(());
        }
        self.write_items(&items).await
    }
}

#[cfg(test)]
#[path = "file_test.rs"]
mod tests;
