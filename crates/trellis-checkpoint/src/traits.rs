//! Extensible checkpoint storage trait for custom backend implementations
//!
//! This module defines **[`CheckpointSaver`]** - the abstraction the execution
//! engine uses to persist and restore per-thread state. Implement it to back
//! checkpoints with any storage system (PostgreSQL, SQLite, Redis, S3, plain
//! files) while keeping the engine's overwrite semantics intact.
//!
//! # Contract
//!
//! - **One current checkpoint per thread.** `save` fully replaces whatever was
//!   stored for that thread id before (last write wins, no partial updates).
//! - **`load` returns the latest.** `None` means the thread has never run.
//! - **Thread isolation.** Records for distinct thread ids are independent;
//!   concurrent saves to *different* threads must be safe. Concurrent saves to
//!   the *same* thread id are the caller's responsibility to serialize, but a
//!   durable backend must still guard its own write path (per-key mutex or
//!   conditional write) so a race cannot corrupt the stored record.
//!
//! # Implementing a custom backend
//!
//! ```rust,ignore
//! use trellis_checkpoint::{Checkpoint, CheckpointSaver, Result};
//! use async_trait::async_trait;
//!
//! struct PostgresSaver {
//!     pool: sqlx::PgPool,
//! }
//!
//! #[async_trait]
//! impl CheckpointSaver for PostgresSaver {
//!     async fn load(&self, thread_id: &str) -> Result<Option<Checkpoint>> {
//!         // SELECT data FROM checkpoints WHERE thread_id = $1
//!         todo!()
//!     }
//!
//!     async fn save(&self, thread_id: &str, checkpoint: Checkpoint) -> Result<()> {
//!         // INSERT ... ON CONFLICT (thread_id) DO UPDATE SET data = $2
//!         todo!()
//!     }
//! }
//! ```

use crate::{checkpoint::Checkpoint, error::Result};
use async_trait::async_trait;

/// Storage backend for per-thread execution checkpoints
///
/// The engine calls [`load`](Self::load) once at the start of each invocation
/// and [`save`](Self::save) after every completed node step, so backends
/// should optimize for single-record reads and writes keyed by thread id.
#[async_trait]
pub trait CheckpointSaver: Send + Sync {
    /// Fetch the current checkpoint for a thread, or `None` if the thread
    /// has no checkpoint yet
    async fn load(&self, thread_id: &str) -> Result<Option<Checkpoint>>;

    /// Store the current checkpoint for a thread, fully replacing any
    /// previously stored checkpoint for that thread id
    async fn save(&self, thread_id: &str, checkpoint: Checkpoint) -> Result<()>;

    /// Delete all stored data for a thread
    ///
    /// Threads are never deleted automatically; this exists for explicit
    /// cleanup by the caller. The default implementation is a no-op.
    async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        let _ = thread_id;
        Ok(())
    }
}
