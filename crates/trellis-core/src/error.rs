//! Error types for graph construction, compilation, and execution
//!
//! The taxonomy splits into build-time errors (caught by
//! [`StateGraph::compile`](crate::graph::StateGraph::compile) before anything
//! runs), schema errors (an update named a field outside the declared state
//! shape), and runtime errors (routing, step limits, node failures, storage).
//! An interrupt is deliberately *not* represented here: suspension is a normal
//! outcome, modeled by [`NodeOutcome::Interrupt`](crate::node::NodeOutcome)
//! and surfaced through
//! [`ExecutionResult`](crate::executor::ExecutionResult).

use crate::schema::SchemaError;
use thiserror::Error;
use trellis_checkpoint::CheckpointError;

/// Boxed error type returned by node handlers
pub type NodeError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by the graph engine
#[derive(Error, Debug)]
pub enum GraphError {
    /// A node name was registered twice
    #[error("Duplicate node: '{0}' is already registered")]
    DuplicateNode(String),

    /// An edge or entry point references a node that is not registered
    #[error("Unknown node '{node}' referenced by {context}")]
    UnknownNode {
        /// The missing node name
        node: String,
        /// What referenced it (edge source, branch target, entry point)
        context: String,
    },

    /// Nodes that cannot be reached from the entry point
    #[error("Unreachable nodes: {}", .0.join(", "))]
    UnreachableNodes(Vec<String>),

    /// A router returned a key with no mapped target
    #[error("Node '{node}' routed to unmapped key '{key}'")]
    UnmappedRoute {
        /// Node whose conditional edge was being resolved
        node: String,
        /// Key the router returned
        key: String,
    },

    /// The per-invocation step cap was exceeded
    #[error("Step limit exceeded: graph did not reach a terminal or interrupt within {limit} steps")]
    StepLimitExceeded {
        /// The configured cap
        limit: usize,
    },

    /// A node handler failed; the checkpoint was not advanced past it
    #[error("Node '{node}' execution failed: {source}")]
    NodeExecution {
        /// The failing node
        node: String,
        /// The handler's error
        #[source]
        source: NodeError,
    },

    /// A state update violated the declared schema
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Checkpoint storage failure
    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    /// `resume` was called on a thread with no pending interrupt
    #[error("Thread '{thread_id}' has no pending interrupt to resume")]
    ResumeWithoutInterrupt {
        /// The offending thread id
        thread_id: String,
    },

    /// Remaining graph validation failures (missing entry, dead ends, ...)
    #[error("Graph validation failed: {0}")]
    Validation(String),
}

impl GraphError {
    /// Wrap a handler failure with the node it came from
    pub fn node_execution(node: impl Into<String>, source: NodeError) -> Self {
        Self::NodeExecution {
            node: node.into(),
            source,
        }
    }

    /// Build an [`GraphError::UnknownNode`] with reference context
    pub fn unknown_node(node: impl Into<String>, context: impl Into<String>) -> Self {
        Self::UnknownNode {
            node: node.into(),
            context: context.into(),
        }
    }
}

/// Result type alias for graph operations
pub type Result<T> = std::result::Result<T, GraphError>;
