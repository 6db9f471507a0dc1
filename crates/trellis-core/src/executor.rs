//! Sequential graph execution with checkpointing and interrupt handling
//!
//! The executor runs one logical thread of control per call: load the
//! thread's checkpoint, merge the caller's input, then run nodes one at a
//! time following edges until the terminal marker, an interrupt, or an error.
//! After every completed node a checkpoint is saved, so the thread can always
//! pick up from its last good state.
//!
//! # Checkpoint consistency
//!
//! The one guarantee the executor adds on top of user code: state is never
//! advanced past a failed step. A handler error, a routing error, or a schema
//! violation all abort the invocation with the checkpoint still pointing at
//! the node that failed, so a retried `invoke` re-runs exactly that node
//! (at-least-once node execution).
//!
//! # Interrupts
//!
//! A node returning [`NodeOutcome::Interrupt`] suspends the run: the
//! checkpoint records the same node as pending together with the interrupt
//! payload, and the caller receives `ExecutionResult { interrupted: true, .. }`.
//! A later [`resume`](CompiledGraph::resume) re-enters that node with the
//! resume value available at its interrupt call site.

use crate::compiled::CompiledGraph;
use crate::error::{GraphError, Result};
use crate::graph::{Edge, END};
use crate::node::{NodeContext, NodeOutcome};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use trellis_checkpoint::{Checkpoint, CheckpointError};

/// Outcome of one `invoke` or `resume` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Whether the run suspended on an interrupt
    pub interrupted: bool,
    /// Interrupt payload, present when `interrupted` is true
    pub payload: Option<Value>,
    /// Final state, present when the run reached the terminal marker
    pub state: Option<Value>,
}

impl ExecutionResult {
    fn completed(state: Value) -> Self {
        Self {
            interrupted: false,
            payload: None,
            state: Some(state),
        }
    }

    fn suspended(payload: Value) -> Self {
        Self {
            interrupted: true,
            payload: Some(payload),
            state: None,
        }
    }
}

impl CompiledGraph {
    /// Run the graph on a thread, merging `input` into its state first
    ///
    /// A fresh thread starts from the schema's initial state at the entry
    /// point. A thread whose previous run completed restarts at the entry
    /// point over its persisted state. A thread stopped mid-graph (after a
    /// failure, or suspended on an interrupt) continues at its pending node;
    /// without a resume value a suspended node will typically interrupt
    /// again.
    #[tracing::instrument(skip(self, input), fields(entry = %self.entry))]
    pub async fn invoke(&self, thread_id: &str, input: Value) -> Result<ExecutionResult> {
        self.run(thread_id, Some(input), None).await
    }

    /// Resume a thread suspended on an interrupt
    ///
    /// Valid only when the thread's checkpoint records a pending interrupt;
    /// otherwise fails with [`GraphError::ResumeWithoutInterrupt`]. The
    /// pending node is re-entered from the top with `resume_value` returned
    /// at its interrupt call site, then execution proceeds normally.
    #[tracing::instrument(skip(self, resume_value))]
    pub async fn resume(&self, thread_id: &str, resume_value: Value) -> Result<ExecutionResult> {
        self.run(thread_id, None, Some(resume_value)).await
    }

    async fn run(
        &self,
        thread_id: &str,
        input: Option<Value>,
        resume: Option<Value>,
    ) -> Result<ExecutionResult> {
        let loaded = self.checkpointer.load(thread_id).await?;

        let (mut state, mut current, mut resume_slot, mut completed_steps) = match (loaded, resume)
        {
            (Some(cp), Some(value)) => {
                if !cp.is_interrupted() {
                    return Err(GraphError::ResumeWithoutInterrupt {
                        thread_id: thread_id.to_string(),
                    });
                }
                let pending = cp.pending_node.clone().ok_or_else(|| {
                    CheckpointError::Invalid(
                        "interrupted checkpoint has no pending node".to_string(),
                    )
                })?;
                (cp.state, pending, Some(value), cp.step)
            }
            (None, Some(_)) => {
                return Err(GraphError::ResumeWithoutInterrupt {
                    thread_id: thread_id.to_string(),
                })
            }
            (Some(cp), None) => {
                let mut state = cp.state;
                if let Some(update) = &input {
                    self.schema.apply(&mut state, update)?;
                }
                let current = cp
                    .pending_node
                    .clone()
                    .unwrap_or_else(|| self.entry.clone());
                (state, current, None, cp.step)
            }
            (None, None) => {
                let mut state = self.schema.initial_state();
                if let Some(update) = &input {
                    self.schema.apply(&mut state, update)?;
                }
                (state, self.entry.clone(), None, 0)
            }
        };

        let mut steps_this_run = 0usize;
        loop {
            if steps_this_run >= self.step_limit {
                return Err(GraphError::StepLimitExceeded {
                    limit: self.step_limit,
                });
            }
            steps_this_run += 1;

            let handler = self
                .nodes
                .get(&current)
                .ok_or_else(|| GraphError::unknown_node(&current, "execution cursor"))?;

            tracing::debug!(node = %current, step = steps_this_run, "executing node");
            let ctx = NodeContext::new(resume_slot.take());
            let outcome = handler(state.clone(), ctx).await.map_err(|e| {
                tracing::error!(node = %current, error = %e, "node handler failed");
                GraphError::node_execution(&current, e)
            })?;

            match outcome {
                NodeOutcome::Interrupt(payload) => {
                    let checkpoint = Checkpoint::new(state)
                        .with_pending_node(&current)
                        .with_interrupt(payload.clone())
                        .with_step(completed_steps);
                    self.checkpointer.save(thread_id, checkpoint).await?;
                    tracing::info!(node = %current, "run suspended on interrupt");
                    return Ok(ExecutionResult::suspended(payload));
                }
                NodeOutcome::Update(update) => {
                    self.schema.apply(&mut state, &update)?;
                    completed_steps += 1;

                    // Resolve the next node before persisting: a routing
                    // error must leave the checkpoint at this node.
                    let next = self.next_node(&current, &state)?;
                    if next == END {
                        let checkpoint =
                            Checkpoint::new(state.clone()).with_step(completed_steps);
                        self.checkpointer.save(thread_id, checkpoint).await?;
                        tracing::info!(steps = steps_this_run, "run completed");
                        return Ok(ExecutionResult::completed(state));
                    }
                    let checkpoint = Checkpoint::new(state.clone())
                        .with_pending_node(&next)
                        .with_step(completed_steps);
                    self.checkpointer.save(thread_id, checkpoint).await?;
                    current = next;
                }
            }
        }
    }

    fn next_node(&self, current: &str, state: &Value) -> Result<String> {
        match self.edges.get(current) {
            Some(Edge::Direct(to)) => Ok(to.clone()),
            Some(Edge::Conditional { router, branches }) => {
                let key = router(state);
                branches
                    .get(&key)
                    .cloned()
                    .ok_or_else(|| GraphError::UnmappedRoute {
                        node: current.to_string(),
                        key,
                    })
            }
            // Ruled out at compile time; kept for cursor corruption in a
            // hand-edited durable checkpoint.
            None => Err(GraphError::Validation(format!(
                "node '{current}' has no outgoing edge"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_execution_result_shapes() {
        let done = ExecutionResult::completed(json!({"ok": true}));
        assert!(!done.interrupted);
        assert_eq!(done.state, Some(json!({"ok": true})));
        assert!(done.payload.is_none());

        let paused = ExecutionResult::suspended(json!({"question": "approve?"}));
        assert!(paused.interrupted);
        assert_eq!(paused.payload, Some(json!({"question": "approve?"})));
        assert!(paused.state.is_none());
    }
}
