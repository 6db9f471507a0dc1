//! Checkpoint data structures
//!
//! A [`Checkpoint`] is the persisted snapshot of one execution thread: the full
//! state value, the node that runs next (if any), and the payload of a pending
//! interrupt (if the thread is suspended waiting for a resume value). Exactly
//! one checkpoint is current per thread; saving a new one fully replaces it.
//!
//! # Cursor semantics
//!
//! The `pending_node` field is the thread's cursor:
//!
//! - `Some(node)` with `interrupt: None` — the thread stopped after completing
//!   the previous node; the next invocation runs `node`.
//! - `Some(node)` with `interrupt: Some(payload)` — `node` suspended itself;
//!   the next invocation re-enters it (with a resume value, if supplied).
//! - `None` — the previous run reached the terminal marker; the next
//!   invocation restarts from the entry point over the persisted state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Current checkpoint format version
pub const CHECKPOINT_VERSION: i32 = 1;

/// A point-in-time snapshot of one thread's execution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Checkpoint {
    /// Format version, for forward compatibility of durable backends
    pub v: i32,

    /// Unique checkpoint identifier (UUID v4)
    pub id: String,

    /// Timestamp when the checkpoint was created
    pub ts: DateTime<Utc>,

    /// Full state value at this point
    pub state: Value,

    /// Node to run on the next invocation; `None` once the run completed
    pub pending_node: Option<String>,

    /// Payload of a pending interrupt, when the thread is suspended
    pub interrupt: Option<Value>,

    /// Number of node steps completed on this thread so far
    pub step: i64,
}

impl Checkpoint {
    /// Create a checkpoint for the given state, with no pending node
    pub fn new(state: Value) -> Self {
        Self {
            v: CHECKPOINT_VERSION,
            id: Uuid::new_v4().to_string(),
            ts: Utc::now(),
            state,
            pending_node: None,
            interrupt: None,
            step: 0,
        }
    }

    /// Set the node to run on the next invocation
    pub fn with_pending_node(mut self, node: impl Into<String>) -> Self {
        self.pending_node = Some(node.into());
        self
    }

    /// Record a pending interrupt payload
    pub fn with_interrupt(mut self, payload: Value) -> Self {
        self.interrupt = Some(payload);
        self
    }

    /// Set the completed step count
    pub fn with_step(mut self, step: i64) -> Self {
        self.step = step;
        self
    }

    /// Whether this thread is suspended awaiting a resume value
    pub fn is_interrupted(&self) -> bool {
        self.interrupt.is_some()
    }

    /// Whether the previous run reached the terminal marker
    pub fn is_completed(&self) -> bool {
        self.pending_node.is_none() && self.interrupt.is_none()
    }
}
