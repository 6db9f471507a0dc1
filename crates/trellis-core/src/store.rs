//! Shared key-value store for node handlers
//!
//! Several workflows need a place to keep data that outlives any single
//! thread's state: user profiles, long-term memories, lookup tables. Rather
//! than reaching for process-global mutable state, callers create a [`Store`]
//! once, capture it in node closures at graph-construction time, and clear it
//! only by explicit action. The engine itself never touches it.
//!
//! ```rust,ignore
//! let store = InMemoryStore::new();
//!
//! let lookup = store.clone();
//! graph.add_node("recall", move |state, _ctx| {
//!     let lookup = lookup.clone();
//!     async move {
//!         let profile = lookup.get("profile:alice").await?;
//!         Ok(NodeOutcome::update(json!({"profile": profile})))
//!     }
//! })?;
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Error type for store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Serialization failure in a persistent backend
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Backend I/O failure
    #[error("I/O error: {0}")]
    Io(String),

    /// Any other backend failure
    #[error("Store error: {0}")]
    Other(String),
}

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Key-value storage shared across threads and invocations
///
/// Implementations can use any backend: in-memory, Redis, a database.
#[async_trait]
pub trait Store: Send + Sync {
    /// Get a value by key, or `None` if absent
    async fn get(&self, key: &str) -> StoreResult<Option<Value>>;

    /// Store a value under a key, replacing any existing value
    async fn put(&self, key: &str, value: Value) -> StoreResult<()>;

    /// Delete a key; returns whether it existed
    async fn delete(&self, key: &str) -> StoreResult<bool>;

    /// List keys, optionally filtered by prefix
    async fn list_keys(&self, prefix: Option<&str>) -> StoreResult<Vec<String>>;

    /// Remove keys matching the prefix (all keys when `None`); returns the
    /// number removed
    async fn clear(&self, prefix: Option<&str>) -> StoreResult<usize>;
}

/// Thread-safe in-memory [`Store`] for development and testing
///
/// Cloning shares the underlying data. For production, implement [`Store`]
/// over a persistent backend.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    data: Arc<RwLock<HashMap<String, Value>>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    /// Whether the store holds no keys
    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Value) -> StoreResult<()> {
        self.data.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        Ok(self.data.write().await.remove(key).is_some())
    }

    async fn list_keys(&self, prefix: Option<&str>) -> StoreResult<Vec<String>> {
        let data = self.data.read().await;
        let keys = match prefix {
            Some(p) => data.keys().filter(|k| k.starts_with(p)).cloned().collect(),
            None => data.keys().cloned().collect(),
        };
        Ok(keys)
    }

    async fn clear(&self, prefix: Option<&str>) -> StoreResult<usize> {
        let mut data = self.data.write().await;
        match prefix {
            Some(p) => {
                let to_remove: Vec<String> =
                    data.keys().filter(|k| k.starts_with(p)).cloned().collect();
                let count = to_remove.len();
                for key in to_remove {
                    data.remove(&key);
                }
                Ok(count)
            }
            None => {
                let count = data.len();
                data.clear();
                Ok(count)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = InMemoryStore::new();
        store.put("profile:alice", json!({"tz": "UTC"})).await.unwrap();

        assert_eq!(
            store.get("profile:alice").await.unwrap(),
            Some(json!({"tz": "UTC"}))
        );
        assert!(store.delete("profile:alice").await.unwrap());
        assert!(!store.delete("profile:alice").await.unwrap());
        assert_eq!(store.get("profile:alice").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_replaces() {
        let store = InMemoryStore::new();
        store.put("k", json!(1)).await.unwrap();
        store.put("k", json!(2)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!(2)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_list_and_clear_by_prefix() {
        let store = InMemoryStore::new();
        store.put("memo:1", json!("a")).await.unwrap();
        store.put("memo:2", json!("b")).await.unwrap();
        store.put("profile:x", json!("c")).await.unwrap();

        let mut memos = store.list_keys(Some("memo:")).await.unwrap();
        memos.sort();
        assert_eq!(memos, vec!["memo:1", "memo:2"]);

        assert_eq!(store.clear(Some("memo:")).await.unwrap(), 2);
        assert_eq!(store.len().await, 1);

        assert_eq!(store.clear(None).await.unwrap(), 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_clones_share_data() {
        let store = InMemoryStore::new();
        let other = store.clone();
        store.put("k", json!("v")).await.unwrap();
        assert_eq!(other.get("k").await.unwrap(), Some(json!("v")));
    }
}
