//! Graph construction: the mutable builder and its edges
//!
//! [`StateGraph`] is the builder callers assemble before anything executes:
//! register named nodes, wire edges (unconditional or conditional), designate
//! the entry point, then [`compile`](StateGraph::compile) into an immutable
//! [`CompiledGraph`]. All structural mistakes surface here or at compile time,
//! never mid-run.
//!
//! # Example
//!
//! ```rust,ignore
//! use trellis_core::{NodeOutcome, StateGraph, END};
//! use trellis_core::schema::{ReplaceReducer, StateSchema};
//! use serde_json::json;
//!
//! let schema = StateSchema::new().with_field("assigned_team", ReplaceReducer);
//! let mut graph = StateGraph::new(schema);
//!
//! graph.add_node("classify", |state, _ctx| async move {
//!     let technical = state["text"].as_str().unwrap_or("").contains("down");
//!     Ok(NodeOutcome::update(json!({"technical": technical})))
//! })?;
//! graph.add_node("eng", |_state, _ctx| async move {
//!     Ok(NodeOutcome::update(json!({"assigned_team": "eng"})))
//! })?;
//!
//! graph.set_entry_point("classify");
//! graph.add_conditional_edge(
//!     "classify",
//!     |state| if state["technical"] == json!(true) { "technical".into() } else { "general".into() },
//!     [("technical", "eng"), ("general", END)],
//! )?;
//! graph.add_edge("eng", END)?;
//!
//! let compiled = graph.compile()?;
//! ```

use crate::compiled::CompiledGraph;
use crate::error::{GraphError, NodeError, Result};
use crate::node::{NodeContext, NodeHandler, NodeOutcome, Router};
use crate::schema::StateSchema;
use serde_json::Value;
use std::collections::{HashMap, HashSet, VecDeque};
use std::future::Future;
use std::sync::Arc;

/// Reserved terminal marker: routing here completes the run
pub const END: &str = "__end__";

/// Outgoing transition of a node
#[derive(Clone)]
pub enum Edge {
    /// Unconditional transition to a node or the terminal marker
    Direct(String),
    /// Destination computed at runtime: the router reads the post-merge state
    /// and returns a key into `branches`
    Conditional {
        /// Routing function
        router: Router,
        /// Allowed router keys mapped to node names or the terminal marker
        branches: HashMap<String, String>,
    },
}

impl std::fmt::Debug for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Edge::Direct(to) => f.debug_tuple("Direct").field(to).finish(),
            Edge::Conditional { branches, .. } => f
                .debug_struct("Conditional")
                .field("router", &"<fn>")
                .field("branches", branches)
                .finish(),
        }
    }
}

/// Mutable graph builder
///
/// Nodes are registered under unique names; each node has at most one
/// outgoing edge (re-adding replaces it). Edge targets may forward-reference
/// nodes added later; the references are resolved at compile time.
pub struct StateGraph {
    schema: StateSchema,
    nodes: HashMap<String, NodeHandler>,
    edges: HashMap<String, Edge>,
    entry: Option<String>,
}

impl StateGraph {
    /// Create a builder over the given state schema
    pub fn new(schema: StateSchema) -> Self {
        Self {
            schema,
            nodes: HashMap::new(),
            edges: HashMap::new(),
            entry: None,
        }
    }

    /// Register a node under a unique name
    ///
    /// Fails with [`GraphError::DuplicateNode`] if the name is taken, or
    /// [`GraphError::Validation`] if it is the reserved terminal marker.
    pub fn add_node<F, Fut>(&mut self, name: impl Into<String>, handler: F) -> Result<&mut Self>
    where
        F: Fn(Value, NodeContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<NodeOutcome, NodeError>> + Send + 'static,
    {
        let name = name.into();
        if name == END {
            return Err(GraphError::Validation(format!(
                "'{END}' is reserved for the terminal marker"
            )));
        }
        if self.nodes.contains_key(&name) {
            return Err(GraphError::DuplicateNode(name));
        }
        let handler: NodeHandler = Arc::new(move |state, ctx| Box::pin(handler(state, ctx)));
        self.nodes.insert(name, handler);
        Ok(self)
    }

    /// Add an unconditional edge
    ///
    /// `from` must already be registered; `to` may be a forward reference or
    /// [`END`].
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) -> Result<&mut Self> {
        let from = from.into();
        if !self.nodes.contains_key(&from) {
            return Err(GraphError::unknown_node(&from, "edge source"));
        }
        self.edges.insert(from, Edge::Direct(to.into()));
        Ok(self)
    }

    /// Add a conditional edge
    ///
    /// At runtime the router is called with the post-merge state; its key is
    /// looked up in `branches`. Branch targets may be forward references or
    /// [`END`] and are validated at compile time. A router key outside the
    /// map is a runtime [`GraphError::UnmappedRoute`].
    pub fn add_conditional_edge<R, I, K, V>(
        &mut self,
        from: impl Into<String>,
        router: R,
        branches: I,
    ) -> Result<&mut Self>
    where
        R: Fn(&Value) -> String + Send + Sync + 'static,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let from = from.into();
        if !self.nodes.contains_key(&from) {
            return Err(GraphError::unknown_node(&from, "conditional edge source"));
        }
        let branches: HashMap<String, String> = branches
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        if branches.is_empty() {
            return Err(GraphError::Validation(format!(
                "conditional edge from '{from}' has no branches"
            )));
        }
        self.edges.insert(
            from,
            Edge::Conditional {
                router: Arc::new(router),
                branches,
            },
        );
        Ok(self)
    }

    /// Designate the single entry point; validated at compile time
    pub fn set_entry_point(&mut self, name: impl Into<String>) -> &mut Self {
        self.entry = Some(name.into());
        self
    }

    /// Validate the graph and produce an immutable, executable instance
    ///
    /// Checks, in order: the entry point is set and registered; every edge
    /// target and branch target resolves to a registered node or [`END`];
    /// every node has an outgoing edge; every node is reachable from the
    /// entry point; the terminal marker is reachable at all. Catching dead
    /// branches here is deliberate: a node that can never run is a build
    /// mistake, not something to ignore silently at runtime.
    pub fn compile(self) -> Result<CompiledGraph> {
        let entry = self
            .entry
            .clone()
            .ok_or_else(|| GraphError::Validation("entry point not set".to_string()))?;
        if !self.nodes.contains_key(&entry) {
            return Err(GraphError::unknown_node(&entry, "entry point"));
        }

        for (from, edge) in &self.edges {
            match edge {
                Edge::Direct(to) => {
                    if to != END && !self.nodes.contains_key(to) {
                        return Err(GraphError::unknown_node(to, format!("edge from '{from}'")));
                    }
                }
                Edge::Conditional { branches, .. } => {
                    for (key, target) in branches {
                        if target != END && !self.nodes.contains_key(target) {
                            return Err(GraphError::unknown_node(
                                target,
                                format!("branch '{key}' of conditional edge from '{from}'"),
                            ));
                        }
                    }
                }
            }
        }

        for name in self.nodes.keys() {
            if !self.edges.contains_key(name) {
                return Err(GraphError::Validation(format!(
                    "node '{name}' has no outgoing edge"
                )));
            }
        }

        // Reachability walk from the entry point.
        let mut visited: HashSet<&str> = HashSet::new();
        let mut terminal_reachable = false;
        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(entry.as_str());
        visited.insert(entry.as_str());
        while let Some(current) = queue.pop_front() {
            let targets: Vec<&str> = match self.edges.get(current) {
                Some(Edge::Direct(to)) => vec![to.as_str()],
                Some(Edge::Conditional { branches, .. }) => {
                    branches.values().map(String::as_str).collect()
                }
                None => Vec::new(),
            };
            for target in targets {
                if target == END {
                    terminal_reachable = true;
                } else if visited.insert(target) {
                    queue.push_back(target);
                }
            }
        }

        let mut unreachable: Vec<String> = self
            .nodes
            .keys()
            .filter(|name| !visited.contains(name.as_str()))
            .cloned()
            .collect();
        if !unreachable.is_empty() {
            unreachable.sort();
            return Err(GraphError::UnreachableNodes(unreachable));
        }
        if !terminal_reachable {
            return Err(GraphError::Validation(
                "no path from the entry point to the terminal marker".to_string(),
            ));
        }

        Ok(CompiledGraph::new(
            self.schema,
            self.nodes,
            self.edges,
            entry,
        ))
    }
}

impl std::fmt::Debug for StateGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut nodes: Vec<&String> = self.nodes.keys().collect();
        nodes.sort();
        f.debug_struct("StateGraph")
            .field("schema", &self.schema)
            .field("nodes", &nodes)
            .field("edges", &self.edges)
            .field("entry", &self.entry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn noop_graph() -> StateGraph {
        StateGraph::new(StateSchema::new())
    }

    fn add_noop(graph: &mut StateGraph, name: &str) {
        graph
            .add_node(name, |_state, _ctx| async {
                Ok(NodeOutcome::update(json!({})))
            })
            .unwrap();
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut graph = noop_graph();
        add_noop(&mut graph, "a");
        let err = graph
            .add_node("a", |_s, _c| async { Ok(NodeOutcome::update(json!({}))) })
            .unwrap_err();
        assert!(matches!(err, GraphError::DuplicateNode(name) if name == "a"));
    }

    #[test]
    fn test_terminal_name_reserved() {
        let mut graph = noop_graph();
        let err = graph
            .add_node(END, |_s, _c| async { Ok(NodeOutcome::update(json!({}))) })
            .unwrap_err();
        assert!(matches!(err, GraphError::Validation(_)));
    }

    #[test]
    fn test_edge_from_unregistered_node_rejected() {
        let mut graph = noop_graph();
        let err = graph.add_edge("ghost", END).unwrap_err();
        assert!(matches!(err, GraphError::UnknownNode { node, .. } if node == "ghost"));
    }

    #[test]
    fn test_forward_reference_resolves_at_compile() {
        let mut graph = noop_graph();
        add_noop(&mut graph, "a");
        graph.add_edge("a", "b").unwrap(); // b not yet registered
        add_noop(&mut graph, "b");
        graph.add_edge("b", END).unwrap();
        graph.set_entry_point("a");
        assert!(graph.compile().is_ok());
    }

    #[test]
    fn test_dangling_edge_target_fails_compile() {
        let mut graph = noop_graph();
        add_noop(&mut graph, "a");
        graph.add_edge("a", "ghost").unwrap();
        graph.set_entry_point("a");
        let err = graph.compile().unwrap_err();
        assert!(matches!(err, GraphError::UnknownNode { node, .. } if node == "ghost"));
    }

    #[test]
    fn test_dangling_branch_target_fails_compile() {
        let mut graph = noop_graph();
        add_noop(&mut graph, "a");
        graph
            .add_conditional_edge("a", |_s| "x".to_string(), [("x", "ghost"), ("y", END)])
            .unwrap();
        graph.set_entry_point("a");
        let err = graph.compile().unwrap_err();
        assert!(matches!(err, GraphError::UnknownNode { node, .. } if node == "ghost"));
    }

    #[test]
    fn test_missing_entry_point_fails_compile() {
        let mut graph = noop_graph();
        add_noop(&mut graph, "a");
        graph.add_edge("a", END).unwrap();
        let err = graph.compile().unwrap_err();
        assert!(matches!(err, GraphError::Validation(_)));
    }

    #[test]
    fn test_unreachable_nodes_listed_sorted() {
        let mut graph = noop_graph();
        add_noop(&mut graph, "entry");
        add_noop(&mut graph, "zeta");
        add_noop(&mut graph, "alpha");
        graph.add_edge("entry", END).unwrap();
        graph.add_edge("zeta", END).unwrap();
        graph.add_edge("alpha", END).unwrap();
        graph.set_entry_point("entry");

        let err = graph.compile().unwrap_err();
        match err {
            GraphError::UnreachableNodes(nodes) => {
                assert_eq!(nodes, vec!["alpha".to_string(), "zeta".to_string()]);
            }
            other => panic!("expected UnreachableNodes, got {other:?}"),
        }
    }

    #[test]
    fn test_dead_end_node_fails_compile() {
        let mut graph = noop_graph();
        add_noop(&mut graph, "a");
        add_noop(&mut graph, "b");
        graph.add_edge("a", "b").unwrap();
        graph.set_entry_point("a");
        // b has no outgoing edge
        let err = graph.compile().unwrap_err();
        assert!(matches!(err, GraphError::Validation(msg) if msg.contains("b")));
    }

    #[test]
    fn test_empty_branch_map_rejected() {
        let mut graph = noop_graph();
        add_noop(&mut graph, "a");
        let err = graph
            .add_conditional_edge("a", |_s| "x".to_string(), Vec::<(String, String)>::new())
            .unwrap_err();
        assert!(matches!(err, GraphError::Validation(_)));
    }

    #[test]
    fn test_conditional_targets_count_for_reachability() {
        let mut graph = noop_graph();
        add_noop(&mut graph, "triage");
        add_noop(&mut graph, "eng");
        graph.set_entry_point("triage");
        graph
            .add_conditional_edge(
                "triage",
                |_s| "technical".to_string(),
                [("technical", "eng"), ("general", END)],
            )
            .unwrap();
        graph.add_edge("eng", END).unwrap();
        assert!(graph.compile().is_ok());
    }
}
