use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::warn;

use crate::errors::ServiceError;
use crate::storage::json_map_store::JsonMapStore;

/// Keys of the blobs the client keeps. Each is read and written on its own.
pub mod keys {
    pub const TOKEN: &str = "spendario.token";
    pub const USER: &str = "spendario.user";
    pub const CATEGORIES: &str = "spendario.categories";
    pub const ONBOARDING: &str = "spendario.onboarding";
}

/// Key-value blob store with local-storage semantics.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn get_item(&self, key: &str) -> Option<String>;
    async fn set_item(&self, key: &str, value: String) -> Result<(), ServiceError>;
    /// Returns whether the key existed.
    async fn remove_item(&self, key: &str) -> Result<bool, ServiceError>;
}

/// Decode a JSON blob. Absent keys yield `None`; corrupt blobs are logged and
/// also yield `None` so callers fall back to their defaults.
pub async fn read_json<T: DeserializeOwned>(store: &dyn LocalStore, key: &str) -> Option<T> {
    let raw = store.get_item(key).await?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(%key, error = %e, "ignoring unparsable local storage blob");
            None
        }
    }
}

pub async fn write_json<T: Serialize>(store: &dyn LocalStore, key: &str, value: &T) -> Result<(), ServiceError> {
    let raw = serde_json::to_string(value).map_err(|e| ServiceError::Storage(e.to_string()))?;
    store.set_item(key, raw).await
}

/// File-backed store: all keys live in one JSON object on disk.
pub struct FileLocalStore {
    store: JsonMapStore<String, String>,
}

impl FileLocalStore {
    /// Open the store at `path`, creating parent directories as needed.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let store = JsonMapStore::<String, String>::open(path).await?;
        Ok(Arc::new(Self { store }))
    }

    pub fn path(&self) -> &std::path::Path {
        self.store.path()
    }
}

#[async_trait]
impl LocalStore for FileLocalStore {
    async fn get_item(&self, key: &str) -> Option<String> { self.store.get(&key.to_string()).await }
    async fn set_item(&self, key: &str, value: String) -> Result<(), ServiceError> { self.store.insert(key.to_string(), value).await }
    async fn remove_item(&self, key: &str) -> Result<bool, ServiceError> { self.store.remove(&key.to_string()).await }
}

/// In-memory store; contents are lost when dropped.
#[derive(Default)]
pub struct MemoryLocalStore {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryLocalStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl LocalStore for MemoryLocalStore {
    async fn get_item(&self, key: &str) -> Option<String> {
        self.items.read().await.get(key).cloned()
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), ServiceError> {
        self.items.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<bool, ServiceError> {
        Ok(self.items.write().await.remove(key).is_some())
    }
}
