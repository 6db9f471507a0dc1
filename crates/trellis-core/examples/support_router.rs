//! Conditional routing demo: a support ticket classifier
//!
//! Run with: cargo run --example support_router -p trellis-core

use serde_json::{json, Value};
use trellis_core::schema::{AppendReducer, ReplaceReducer, StateSchema};
use trellis_core::{NodeOutcome, StateGraph, END};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let schema = StateSchema::new()
        .with_field("text", ReplaceReducer)
        .with_field("technical", ReplaceReducer)
        .with_field("assigned_team", ReplaceReducer)
        .with_field("log", AppendReducer);

    let mut graph = StateGraph::new(schema);

    graph.add_node("classify", |state: Value, _ctx| async move {
        let text = state["text"].as_str().unwrap_or("");
        let technical = text.contains("down") || text.contains("error");
        Ok(NodeOutcome::update(
            json!({"technical": technical, "log": ["classified"]}),
        ))
    })?;

    graph.add_node("eng", |_state, _ctx| async move {
        Ok(NodeOutcome::update(
            json!({"assigned_team": "eng", "log": ["escalated to engineering"]}),
        ))
    })?;

    graph.add_node("general", |_state, _ctx| async move {
        Ok(NodeOutcome::update(
            json!({"assigned_team": "support", "log": ["queued for support"]}),
        ))
    })?;

    graph.set_entry_point("classify");
    graph.add_conditional_edge(
        "classify",
        |state: &Value| {
            if state["technical"] == json!(true) {
                "technical".to_string()
            } else {
                "general".to_string()
            }
        },
        [("technical", "eng"), ("general", "general")],
    )?;
    graph.add_edge("eng", END)?;
    graph.add_edge("general", END)?;

    let compiled = graph.compile()?;

    for (thread, text) in [
        ("ticket-1", "the api server is down"),
        ("ticket-2", "how do I change my plan?"),
    ] {
        let result = compiled.invoke(thread, json!({"text": text})).await?;
        let state = result.state.expect("run completed");
        println!(
            "{thread}: {:?} -> team {}",
            text, state["assigned_team"]
        );
    }

    Ok(())
}
