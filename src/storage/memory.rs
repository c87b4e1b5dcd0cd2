use moka::future::Cache;

use crate::error::StoreError;
use crate::storage::KeyValueStore;

/// In-process store backed by an unbounded moka cache (no TTL, no eviction).
///
/// Clones share the same entries, so a test can keep a handle and inspect
/// what the roster wrote.
#[derive(Clone)]
pub struct MemoryStore {
    entries: Cache<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Cache::builder().build(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).await)
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value).await;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.entries.invalidate_all();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clones_share_entries() {
        let store = MemoryStore::new();
        let handle = store.clone();

        store.set_item("shifts", "[]".to_string()).await.unwrap();
        assert_eq!(handle.get_item("shifts").await.unwrap().as_deref(), Some("[]"));
        assert_eq!(handle.get_item("employees").await.unwrap(), None);

        handle.clear().await.unwrap();
        assert_eq!(store.get_item("shifts").await.unwrap(), None);
    }
}
