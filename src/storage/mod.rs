//! Durable key-value storage for session credentials.
//!
//! DESIGN
//! ======
//! The session store only needs three operations: set one key, get many keys,
//! remove many keys. [`KeyValueStore`] captures exactly that so tests can
//! substitute failing or in-memory implementations. [`FileStore`] is the
//! on-device implementation.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage contents corrupt: {0}")]
    Corrupt(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Async key-value persistence. Values are opaque strings.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Read each key in order. Missing keys yield `None`.
    async fn multi_get(&self, keys: &[&str]) -> Result<Vec<(String, Option<String>)>, StorageError>;

    /// Remove each key. Missing keys are ignored.
    async fn multi_remove(&self, keys: &[&str]) -> Result<(), StorageError>;
}

#[async_trait::async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value).await
    }

    async fn multi_get(&self, keys: &[&str]) -> Result<Vec<(String, Option<String>)>, StorageError> {
        (**self).multi_get(keys).await
    }

    async fn multi_remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        (**self).multi_remove(keys).await
    }
}
