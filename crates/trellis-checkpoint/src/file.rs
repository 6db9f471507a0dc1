//! File-backed checkpoint storage
//!
//! [`FileSaver`] persists one file per thread under a base directory, so
//! checkpoints survive process restarts. Writes go to a temporary file first
//! and are renamed into place, keeping the stored record whole even if the
//! process dies mid-write. A per-saver mutex serializes writes so two saves
//! racing on the same thread id cannot interleave the temp-and-rename pair.

use crate::{
    checkpoint::Checkpoint,
    error::{CheckpointError, Result},
    serializer::{JsonSerializer, SerializerProtocol},
    traits::CheckpointSaver,
};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Checkpoint saver backed by one file per thread
///
/// # Example
///
/// ```rust,ignore
/// use trellis_checkpoint::{Checkpoint, CheckpointSaver, FileSaver};
/// use serde_json::json;
///
/// let saver = FileSaver::new("/var/lib/myapp/checkpoints").await?;
/// saver.save("session-1", Checkpoint::new(json!({"count": 1}))).await?;
/// // ... process restarts ...
/// let restored = saver.load("session-1").await?;
/// ```
pub struct FileSaver {
    dir: PathBuf,
    serializer: Arc<dyn SerializerProtocol>,
    write_lock: Mutex<()>,
}

impl FileSaver {
    /// Create a file saver rooted at `dir`, creating the directory if needed
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_serializer(dir, Arc::new(JsonSerializer)).await
    }

    /// Create a file saver with a custom serialization format
    pub async fn with_serializer(
        dir: impl Into<PathBuf>,
        serializer: Arc<dyn SerializerProtocol>,
    ) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            serializer,
            write_lock: Mutex::new(()),
        })
    }

    fn thread_path(&self, thread_id: &str) -> PathBuf {
        self.dir
            .join(format!("{}.checkpoint", encode_thread_id(thread_id)))
    }
}

/// Map an arbitrary thread id onto a safe file name
///
/// Alphanumerics, `-`, `_` and `.` pass through; everything else becomes
/// `%XX`. The mapping is injective, so distinct thread ids never collide.
fn encode_thread_id(thread_id: &str) -> String {
    let mut out = String::with_capacity(thread_id.len());
    for byte in thread_id.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{:02X}", other)),
        }
    }
    out
}

impl std::fmt::Debug for FileSaver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSaver")
            .field("dir", &self.dir)
            .field("format", &self.serializer.format())
            .finish()
    }
}

#[async_trait]
impl CheckpointSaver for FileSaver {
    async fn load(&self, thread_id: &str) -> Result<Option<Checkpoint>> {
        let path = self.thread_path(thread_id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(self.serializer.loads(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CheckpointError::Io(e)),
        }
    }

    async fn save(&self, thread_id: &str, checkpoint: Checkpoint) -> Result<()> {
        let bytes = self.serializer.dumps(&checkpoint)?;
        let path = self.thread_path(thread_id);
        let tmp = path.with_extension("tmp");

        let _guard = self.write_lock.lock().await;
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        let path = self.thread_path(thread_id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CheckpointError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("trellis-file-saver-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_save_load_across_instances() {
        let dir = scratch_dir();
        let cp = Checkpoint::new(json!({"messages": ["hi"]})).with_pending_node("reply");

        {
            let saver = FileSaver::new(&dir).await.unwrap();
            saver.save("session", cp.clone()).await.unwrap();
        }

        // A fresh saver over the same directory sees the stored checkpoint.
        let saver = FileSaver::new(&dir).await.unwrap();
        let loaded = saver.load("session").await.unwrap().unwrap();
        assert_eq!(loaded, cp);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_thread_is_none() {
        let dir = scratch_dir();
        let saver = FileSaver::new(&dir).await.unwrap();
        assert!(saver.load("never-ran").await.unwrap().is_none());
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let dir = scratch_dir();
        let saver = FileSaver::new(&dir).await.unwrap();

        saver
            .save("t", Checkpoint::new(json!({"n": 1})))
            .await
            .unwrap();
        saver
            .save("t", Checkpoint::new(json!({"n": 2})))
            .await
            .unwrap();

        let loaded = saver.load("t").await.unwrap().unwrap();
        assert_eq!(loaded.state, json!({"n": 2}));
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_thread() {
        let dir = scratch_dir();
        let saver = FileSaver::new(&dir).await.unwrap();

        saver.save("t", Checkpoint::new(json!({}))).await.unwrap();
        saver.delete_thread("t").await.unwrap();
        assert!(saver.load("t").await.unwrap().is_none());

        // Deleting again is not an error.
        saver.delete_thread("t").await.unwrap();
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[test]
    fn test_thread_id_encoding() {
        assert_eq!(encode_thread_id("plain-id_1.2"), "plain-id_1.2");
        assert_eq!(encode_thread_id("a/b"), "a%2Fb");
        assert_ne!(encode_thread_id("a/b"), encode_thread_id("a_b"));
    }
}
