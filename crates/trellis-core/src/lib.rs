//! # trellis-core - Stateful Graph Execution Engine
//!
//! A small orchestration runtime that runs a directed graph of processing
//! steps over shared state, with conditional branching, per-thread
//! checkpointing, and first-class suspend/resume for human-in-the-loop
//! workflows.
//!
//! ## Overview
//!
//! Build a graph from opaque async nodes, compile it, and invoke it per
//! logical "thread" (a caller-chosen id scoping one lineage of state):
//!
//! - **State schema** - state is a JSON object; each field declares a
//!   [`Reducer`](schema::Reducer) that merges partial updates (replace,
//!   append, merge, sum)
//! - **Graph builder** - named nodes, unconditional edges, conditional edges
//!   with router functions, one entry point, a reserved terminal marker
//! - **Compiler** - validates endpoints, requires every node reachable from
//!   the entry, rejects dead ends before anything runs
//! - **Executor** - runs nodes strictly sequentially, merges each update
//!   through the schema, checkpoints after every step, and enforces a step
//!   cap against accidental infinite cycles
//! - **Interrupts** - a node can suspend the run with a payload for the
//!   caller; `resume` re-enters that exact node with the caller's answer
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use trellis_core::schema::{AppendReducer, ReplaceReducer, StateSchema};
//! use trellis_core::{NodeOutcome, StateGraph, END};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let schema = StateSchema::new()
//!         .with_field("text", ReplaceReducer)
//!         .with_field("assigned_team", ReplaceReducer)
//!         .with_field("log", AppendReducer);
//!
//!     let mut graph = StateGraph::new(schema);
//!     graph.add_node("classify", |state, _ctx| async move {
//!         let technical = state["text"].as_str().unwrap_or("").contains("down");
//!         Ok(NodeOutcome::update(json!({"log": ["classified"], "technical": technical})))
//!     })?;
//!     graph.add_node("eng", |_state, _ctx| async move {
//!         Ok(NodeOutcome::update(json!({"assigned_team": "eng"})))
//!     })?;
//!     graph.set_entry_point("classify");
//!     graph.add_conditional_edge(
//!         "classify",
//!         |state| {
//!             if state["technical"] == json!(true) { "technical".into() } else { "general".into() }
//!         },
//!         [("technical", "eng"), ("general", END)],
//!     )?;
//!     graph.add_edge("eng", END)?;
//!
//!     let compiled = graph.compile()?;
//!     let result = compiled.invoke("ticket-17", json!({"text": "server is down"})).await?;
//!     assert_eq!(result.state.unwrap()["assigned_team"], json!("eng"));
//!     Ok(())
//! }
//! ```
//!
//! ## Human-in-the-loop
//!
//! ```rust,ignore
//! graph.add_node("approve", |_state, mut ctx| async move {
//!     let decision = match ctx.interrupt(json!({"question": "approve?"})) {
//!         Ok(value) => value,
//!         Err(signal) => return Ok(signal.into()),
//!     };
//!     Ok(NodeOutcome::update(json!({"approved": decision == "yes"})))
//! })?;
//!
//! let first = compiled.invoke("req-1", json!({})).await?;
//! assert!(first.interrupted);            // payload: {"question": "approve?"}
//!
//! let second = compiled.resume("req-1", json!("yes")).await?;
//! assert!(!second.interrupted);          // state: {... "approved": true ...}
//! ```
//!
//! Resume re-runs the interrupted handler from the top with the resume value
//! substituted at the interrupt call site; handlers must be idempotent up to
//! that point.
//!
//! ## Module Organization
//!
//! - [`schema`] - [`StateSchema`](schema::StateSchema) and the built-in reducers
//! - [`graph`] - [`StateGraph`] builder, [`Edge`](graph::Edge), [`END`]
//! - [`compiled`] - [`CompiledGraph`] and its configuration
//! - [`executor`] - `invoke`/`resume` and [`ExecutionResult`]
//! - [`node`] - [`NodeOutcome`], [`NodeContext`], handler/router types
//! - [`store`] - shared key-value [`Store`](store::Store) for node closures
//! - [`error`] - [`GraphError`] taxonomy
//!
//! Checkpoint storage lives in the companion `trellis-checkpoint` crate and
//! is re-exported here for convenience.

pub mod compiled;
pub mod error;
pub mod executor;
pub mod graph;
pub mod node;
pub mod schema;
pub mod store;

pub use compiled::{CompiledGraph, DEFAULT_STEP_LIMIT};
pub use error::{GraphError, NodeError, Result};
pub use executor::ExecutionResult;
pub use graph::{StateGraph, END};
pub use node::{InterruptSignal, NodeContext, NodeHandler, NodeOutcome, Router};
pub use schema::{AppendReducer, MergeReducer, Reducer, ReplaceReducer, StateSchema, SumReducer};
pub use store::{InMemoryStore, Store};

// Re-export the checkpoint surface used by callers wiring up persistence.
pub use trellis_checkpoint::{Checkpoint, CheckpointSaver, FileSaver, InMemorySaver};
