//! In-memory checkpoint storage for development and testing
//!
//! [`InMemorySaver`] is the reference implementation of [`CheckpointSaver`]: a
//! thread-safe map from thread id to that thread's current checkpoint. Data
//! lives for the lifetime of the process.
//!
//! # When to use
//!
//! - Development, prototyping, and tests (the [`clear`](InMemorySaver::clear)
//!   helper gives cheap test isolation)
//! - Single-process workflows where persistence across restarts is not needed
//!
//! For durability within one machine see [`FileSaver`](crate::file::FileSaver);
//! for anything multi-process, implement [`CheckpointSaver`] over a database.
//!
//! # Example
//!
//! ```rust,ignore
//! use trellis_checkpoint::{Checkpoint, CheckpointSaver, InMemorySaver};
//! use serde_json::json;
//!
//! let saver = InMemorySaver::new();
//! saver.save("session-1", Checkpoint::new(json!({"count": 1}))).await?;
//!
//! let loaded = saver.load("session-1").await?.unwrap();
//! assert_eq!(loaded.state, json!({"count": 1}));
//! ```

use crate::{checkpoint::Checkpoint, error::Result, traits::CheckpointSaver};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Thread-safe in-memory checkpoint storage
type CheckpointStorage = Arc<RwLock<HashMap<String, Checkpoint>>>;

/// In-memory checkpoint saver implementation
///
/// Keeps exactly one checkpoint per thread id; each save replaces the previous
/// entry for that thread. Cloning shares the underlying storage.
#[derive(Debug, Clone, Default)]
pub struct InMemorySaver {
    storage: CheckpointStorage,
}

impl InMemorySaver {
    /// Create a new in-memory checkpoint saver
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of threads with a stored checkpoint
    pub async fn thread_count(&self) -> usize {
        self.storage.read().await.len()
    }

    /// Remove all stored checkpoints (useful for testing)
    pub async fn clear(&self) {
        self.storage.write().await.clear();
    }
}

#[async_trait]
impl CheckpointSaver for InMemorySaver {
    async fn load(&self, thread_id: &str) -> Result<Option<Checkpoint>> {
        Ok(self.storage.read().await.get(thread_id).cloned())
    }

    async fn save(&self, thread_id: &str, checkpoint: Checkpoint) -> Result<()> {
        self.storage
            .write()
            .await
            .insert(thread_id.to_string(), checkpoint);
        Ok(())
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        self.storage.write().await.remove(thread_id);
        Ok(())
    }
}
