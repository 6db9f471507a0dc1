//! # trellis-checkpoint - State Persistence for Graph Execution
//!
//! **Trait-based checkpoint abstractions and storage backends** for persisting
//! and restoring per-thread execution state. Checkpointing is what lets a
//! trellis graph survive process restarts, retry failed nodes from the last
//! good state, and suspend mid-run awaiting human input.
//!
//! ## Overview
//!
//! A [`Checkpoint`] is the snapshot of one execution thread: the merged state
//! value, the node that runs next, and the payload of a pending interrupt when
//! the thread is suspended. The engine writes a checkpoint after every
//! completed node step; each write fully replaces the thread's previous
//! checkpoint (last write wins, exactly one current checkpoint per thread).
//!
//! ## Storage backends
//!
//! - [`InMemorySaver`] - HashMap behind an async `RwLock`; development and tests
//! - [`FileSaver`] - one JSON file per thread with atomic replace; single-node
//!   durability across restarts
//! - Custom - implement [`CheckpointSaver`] over a database or object store;
//!   the interface is two single-record operations keyed by thread id
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use trellis_checkpoint::{Checkpoint, CheckpointSaver, InMemorySaver};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let saver = InMemorySaver::new();
//!
//!     let checkpoint = Checkpoint::new(json!({"messages": []}))
//!         .with_pending_node("triage");
//!     saver.save("session-42", checkpoint).await?;
//!
//!     if let Some(cp) = saver.load("session-42").await? {
//!         println!("next node: {:?}", cp.pending_node);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`checkpoint`] - [`Checkpoint`] data structure and cursor semantics
//! - [`traits`] - [`CheckpointSaver`] storage trait
//! - [`memory`] - [`InMemorySaver`] reference implementation
//! - [`file`] - [`FileSaver`] durable file backend
//! - [`serializer`] - [`SerializerProtocol`] byte encoding for durable backends
//! - [`error`] - [`CheckpointError`] types

pub mod checkpoint;
pub mod error;
pub mod file;
pub mod memory;
pub mod serializer;
pub mod traits;

pub use checkpoint::{Checkpoint, CHECKPOINT_VERSION};
pub use error::{CheckpointError, Result};
pub use file::FileSaver;
pub use memory::InMemorySaver;
pub use serializer::{JsonSerializer, SerializerProtocol};
pub use traits::CheckpointSaver;
