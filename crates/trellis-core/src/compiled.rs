//! The immutable, executable graph
//!
//! Produced by [`StateGraph::compile`](crate::graph::StateGraph::compile).
//! A [`CompiledGraph`] is cheap to clone (internals are shared behind `Arc`s)
//! and safe to share across tasks; distinct threads of execution are isolated
//! by thread id in the checkpointer, so one instance can serve many
//! concurrent conversations.

use crate::graph::Edge;
use crate::node::NodeHandler;
use crate::schema::StateSchema;
use std::collections::HashMap;
use std::sync::Arc;
use trellis_checkpoint::{CheckpointSaver, InMemorySaver};

/// Default per-invocation step cap; generous but finite
pub const DEFAULT_STEP_LIMIT: usize = 1000;

/// Validated, executable graph instance
#[derive(Clone)]
pub struct CompiledGraph {
    pub(crate) schema: Arc<StateSchema>,
    pub(crate) nodes: Arc<HashMap<String, NodeHandler>>,
    pub(crate) edges: Arc<HashMap<String, Edge>>,
    pub(crate) entry: String,
    pub(crate) checkpointer: Arc<dyn CheckpointSaver>,
    pub(crate) step_limit: usize,
}

impl CompiledGraph {
    pub(crate) fn new(
        schema: StateSchema,
        nodes: HashMap<String, NodeHandler>,
        edges: HashMap<String, Edge>,
        entry: String,
    ) -> Self {
        Self {
            schema: Arc::new(schema),
            nodes: Arc::new(nodes),
            edges: Arc::new(edges),
            entry,
            checkpointer: Arc::new(InMemorySaver::new()),
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }

    /// Attach a checkpoint storage backend
    ///
    /// The default is a fresh [`InMemorySaver`]; pass a shared or durable
    /// saver to keep thread state across graph instances or restarts.
    pub fn with_checkpointer(mut self, checkpointer: Arc<dyn CheckpointSaver>) -> Self {
        self.checkpointer = checkpointer;
        self
    }

    /// Set the per-invocation step cap guarding against runaway cycles
    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = limit;
        self
    }

    /// The entry point node
    pub fn entry_point(&self) -> &str {
        &self.entry
    }

    /// Number of registered nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The configured step cap
    pub fn step_limit(&self) -> usize {
        self.step_limit
    }
}

impl std::fmt::Debug for CompiledGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut nodes: Vec<&String> = self.nodes.keys().collect();
        nodes.sort();
        f.debug_struct("CompiledGraph")
            .field("entry", &self.entry)
            .field("nodes", &nodes)
            .field("step_limit", &self.step_limit)
            .finish()
    }
}
