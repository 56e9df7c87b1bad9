use std::collections::HashMap;

use tokio::sync::Mutex;

use super::{KeyValueStore, StorageError};

/// Process-local store. Contents are lost when the value is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.lock().await.is_empty()
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.lock().await.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn multi_get(&self, keys: &[&str]) -> Result<Vec<(String, Option<String>)>, StorageError> {
        let items = self.items.lock().await;
        Ok(keys.iter().map(|k| ((*k).to_owned(), items.get(*k).cloned())).collect())
    }

    async fn multi_remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut items = self.items.lock().await;
        for key in keys {
            items.remove(*key);
        }
        Ok(())
    }
}
