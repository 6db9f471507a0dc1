//! Human-in-the-loop demo: suspend for approval, resume with the answer
//!
//! Run with: cargo run --example approval_flow -p trellis-core

use serde_json::json;
use trellis_core::schema::{AppendReducer, ReplaceReducer, StateSchema};
use trellis_core::{NodeOutcome, StateGraph, END};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let schema = StateSchema::new()
        .with_field("draft", ReplaceReducer)
        .with_field("approved", ReplaceReducer)
        .with_field("log", AppendReducer);

    let mut graph = StateGraph::new(schema);

    graph.add_node("draft", |_state, _ctx| async move {
        Ok(NodeOutcome::update(json!({
            "draft": "Refund approved for order #1423",
            "log": ["draft written"],
        })))
    })?;

    graph.add_node("review", |state, mut ctx| async move {
        let answer = match ctx.interrupt(json!({
            "question": "send this reply?",
            "draft": state["draft"],
            "options": ["yes", "no"],
        })) {
            Ok(value) => value,
            Err(signal) => return Ok(signal.into()),
        };
        Ok(NodeOutcome::update(json!({
            "approved": answer == json!("yes"),
            "log": ["reviewed"],
        })))
    })?;

    graph.set_entry_point("draft");
    graph.add_edge("draft", "review")?;
    graph.add_edge("review", END)?;

    let compiled = graph.compile()?;

    let first = compiled.invoke("case-7", json!({})).await?;
    assert!(first.interrupted);
    println!("suspended: {}", first.payload.expect("interrupt payload"));

    // A human answers out of band; the thread picks up where it stopped.
    let second = compiled.resume("case-7", json!("yes")).await?;
    let state = second.state.expect("run completed");
    println!("approved: {}", state["approved"]);
    println!("log: {}", state["log"]);

    Ok(())
}
