//! Node handlers, outcomes, and the interrupt gate
//!
//! A node is an opaque async function from the current state to a
//! [`NodeOutcome`]: either a partial state update or an interrupt carrying a
//! payload for the caller. Suspension is a tagged variant, not an error, so
//! the executor's control flow stays explicit and a genuine handler failure
//! (the `Err` arm) is never confused with "pause here and ask a human".
//!
//! # Interrupting and resuming
//!
//! Handlers receive a [`NodeContext`] holding the resume value when the run
//! re-enters a previously interrupted node. [`NodeContext::interrupt`] is the
//! call site: the first time through it yields an [`InterruptSignal`] the
//! handler returns as its outcome; on re-entry it returns the caller's resume
//! value instead, and the rest of the handler body runs with it.
//!
//! ```rust,ignore
//! graph.add_node("approve", |_state, mut ctx: NodeContext| async move {
//!     let decision = match ctx.interrupt(json!({"question": "approve?"})) {
//!         Ok(value) => value,
//!         Err(signal) => return Ok(signal.into()),
//!     };
//!     Ok(NodeOutcome::update(json!({"approved": decision == "yes"})))
//! })?;
//! ```
//!
//! Resume re-runs the whole handler body from the top, so any side effects
//! before the interrupt call execute again. Handlers that interrupt must be
//! idempotent up to the interrupt point.

use crate::error::NodeError;
use futures::future::BoxFuture;
use serde_json::Value;
use std::sync::Arc;

/// What a node produced: a partial state update, or a suspension
#[derive(Debug, Clone, PartialEq)]
pub enum NodeOutcome {
    /// Partial state update, merged through the schema reducers
    Update(Value),
    /// Suspend the run and surface this payload to the caller
    Interrupt(Value),
}

impl NodeOutcome {
    /// Partial state update outcome
    pub fn update(update: Value) -> Self {
        Self::Update(update)
    }

    /// Suspension outcome carrying a payload for the caller
    pub fn interrupt(payload: Value) -> Self {
        Self::Interrupt(payload)
    }

    /// Whether this outcome suspends the run
    pub fn is_interrupt(&self) -> bool {
        matches!(self, Self::Interrupt(_))
    }
}

/// Raised by [`NodeContext::interrupt`] when no resume value is pending
///
/// Converts into [`NodeOutcome::Interrupt`], so `return Ok(signal.into())` is
/// the standard way out of a handler body at the interrupt point.
#[derive(Debug, Clone, PartialEq)]
pub struct InterruptSignal {
    /// Payload surfaced to the caller
    pub payload: Value,
}

impl From<InterruptSignal> for NodeOutcome {
    fn from(signal: InterruptSignal) -> Self {
        NodeOutcome::Interrupt(signal.payload)
    }
}

/// Per-invocation context handed to each handler call
///
/// Carries the resume value when this call re-enters an interrupted node.
/// The value is consumed by the first [`interrupt`](Self::interrupt) call;
/// a second interrupt in the same body suspends anew.
#[derive(Debug, Default)]
pub struct NodeContext {
    resume: Option<Value>,
}

impl NodeContext {
    pub(crate) fn new(resume: Option<Value>) -> Self {
        Self { resume }
    }

    /// The interrupt call site
    ///
    /// Returns the pending resume value if one was supplied for this node
    /// (consuming it), otherwise an [`InterruptSignal`] carrying `payload`.
    pub fn interrupt(&mut self, payload: Value) -> Result<Value, InterruptSignal> {
        match self.resume.take() {
            Some(value) => Ok(value),
            None => Err(InterruptSignal { payload }),
        }
    }

    /// Peek at the pending resume value without consuming it
    pub fn resume_value(&self) -> Option<&Value> {
        self.resume.as_ref()
    }
}

/// Boxed future returned by node handlers
pub type NodeFuture = BoxFuture<'static, Result<NodeOutcome, NodeError>>;

/// Type-erased node handler stored in the graph's registry
pub type NodeHandler = Arc<dyn Fn(Value, NodeContext) -> NodeFuture + Send + Sync>;

/// Routing function for conditional edges: reads the post-merge state and
/// returns a key into the edge's branch map
pub type Router = Arc<dyn Fn(&Value) -> String + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_interrupt_without_resume_yields_signal() {
        let mut ctx = NodeContext::new(None);
        let signal = ctx.interrupt(json!({"question": "ok?"})).unwrap_err();
        assert_eq!(signal.payload, json!({"question": "ok?"}));

        let outcome: NodeOutcome = signal.into();
        assert!(outcome.is_interrupt());
    }

    #[test]
    fn test_interrupt_with_resume_returns_value_once() {
        let mut ctx = NodeContext::new(Some(json!("yes")));
        assert_eq!(ctx.resume_value(), Some(&json!("yes")));

        let value = ctx.interrupt(json!({"question": "ok?"})).unwrap();
        assert_eq!(value, json!("yes"));

        // Consumed: a second interrupt in the same body suspends again.
        assert!(ctx.interrupt(json!({"question": "more?"})).is_err());
    }

    #[test]
    fn test_outcome_constructors() {
        assert!(!NodeOutcome::update(json!({})).is_interrupt());
        assert!(NodeOutcome::interrupt(json!("why")).is_interrupt());
    }
}
