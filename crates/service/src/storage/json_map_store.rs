use std::{collections::HashMap, hash::Hash, path::PathBuf};
use tokio::{fs, sync::RwLock};
use tracing::warn;

use crate::errors::ServiceError;

/// JSON file-backed map, cached in memory.
///
/// The whole map is rewritten on every mutation (write to a sibling temp file,
/// then rename). Writers in other processes are not coordinated: the last
/// write wins.
pub struct JsonMapStore<K, V> {
    inner: RwLock<HashMap<K, V>>,
    file_path: PathBuf,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Eq + Hash + serde::Serialize + serde::de::DeserializeOwned + Clone,
    V: serde::Serialize + serde::de::DeserializeOwned + Clone,
{
    /// Load the map from `path`. A missing file starts empty; an unreadable
    /// or corrupt one is logged and also starts empty.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Self, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| ServiceError::Storage(e.to_string()))?;
        }

        let map = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(path = %file_path.display(), error = %e, "local storage file is corrupt; starting empty");
                HashMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(ServiceError::Storage(e.to_string())),
        };

        Ok(Self { inner: RwLock::new(map), file_path })
    }

    pub fn path(&self) -> &std::path::Path {
        &self.file_path
    }

    async fn save(&self, map: &HashMap<K, V>) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(map).map_err(|e| ServiceError::Storage(e.to_string()))?;
        let tmp = self.file_path.with_extension("tmp");
        fs::write(&tmp, data).await.map_err(|e| ServiceError::Storage(e.to_string()))?;
        fs::rename(&tmp, &self.file_path).await.map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(())
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        self.inner.read().await.get(key).cloned()
    }

    /// Insert or replace a value and persist.
    pub async fn insert(&self, key: K, value: V) -> Result<(), ServiceError> {
        let mut map = self.inner.write().await;
        map.insert(key, value);
        self.save(&map).await
    }

    /// Remove a key and persist; returns whether it existed.
    pub async fn remove(&self, key: &K) -> Result<bool, ServiceError> {
        let mut map = self.inner.write().await;
        let existed = map.remove(key).is_some();
        if existed {
            self.save(&map).await?;
        }
        Ok(existed)
    }

    pub async fn keys(&self) -> Vec<K> {
        self.inner.read().await.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("spendario_{tag}_{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn writes_survive_reopen() -> Result<(), anyhow::Error> {
        let tmp = tmp_path("map_store");
        let store = JsonMapStore::<String, String>::open(&tmp).await?;
        assert!(store.keys().await.is_empty());

        store.insert("spendario.token".into(), "abc".into()).await?;
        store.insert("spendario.user".into(), "{}".into()).await?;
        assert!(store.remove(&"spendario.user".into()).await?);
        assert!(!store.remove(&"spendario.user".into()).await?);

        let reopened = JsonMapStore::<String, String>::open(&tmp).await?;
        assert_eq!(reopened.keys().await, vec!["spendario.token".to_string()]);
        assert_eq!(reopened.get(&"spendario.token".into()).await.as_deref(), Some("abc"));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_starts_empty() -> Result<(), anyhow::Error> {
        let tmp = tmp_path("map_store_corrupt");
        tokio::fs::write(&tmp, b"{not json").await?;
        let store = JsonMapStore::<String, String>::open(&tmp).await?;
        assert!(store.keys().await.is_empty());

        store.insert("k".into(), "v".into()).await?;
        let reopened = JsonMapStore::<String, String>::open(&tmp).await?;
        assert_eq!(reopened.get(&"k".into()).await.as_deref(), Some("v"));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
