//! State schema and reducer-based merging
//!
//! All graph state is a JSON object. The [`StateSchema`] declares which fields
//! exist and, per field, a [`Reducer`] that combines the current value with an
//! incoming partial update. Nodes return partial updates; the executor merges
//! them through the schema after every step, so the merge rules are the single
//! place where "how do updates combine" is decided.
//!
//! # Built-in reducers
//!
//! | Reducer | Semantics | Typical field |
//! |---------|-----------|---------------|
//! | [`ReplaceReducer`] | incoming overwrites current | flags, summaries, routing labels |
//! | [`AppendReducer`] | incoming concatenated onto a list | message/log histories |
//! | [`MergeReducer`] | shallow object merge, incoming keys win | metadata maps |
//! | [`SumReducer`] | numeric accumulation | counters, token totals |
//!
//! Reducers are pure and total over their accepted types: a current value of
//! `null` means "unset" and every reducer handles it (append and merge treat
//! it as empty, sum as zero, replace ignores it).
//!
//! # Strictness
//!
//! An update naming a field outside the schema fails with
//! [`SchemaError::UndeclaredField`] and leaves the state untouched. Catching
//! typos at the merge boundary beats debugging a field that silently never
//! joins the state.
//!
//! # Example
//!
//! ```rust
//! use trellis_core::schema::{AppendReducer, ReplaceReducer, StateSchema};
//! use serde_json::json;
//!
//! let schema = StateSchema::new()
//!     .with_field("summary", ReplaceReducer)
//!     .with_field("messages", AppendReducer);
//!
//! let mut state = schema.initial_state();
//! schema.apply(&mut state, &json!({"messages": ["hello"]})).unwrap();
//! schema.apply(&mut state, &json!({"messages": ["world"], "summary": "greeting"})).unwrap();
//!
//! assert_eq!(state["messages"], json!(["hello", "world"]));
//! assert_eq!(state["summary"], json!("greeting"));
//! ```

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while merging updates through a schema
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// Update names a field the schema does not declare
    #[error("Undeclared field '{0}' in state update")]
    UndeclaredField(String),

    /// Update is not a JSON object
    #[error("Invalid state update: {0}")]
    InvalidUpdate(String),

    /// A reducer could not combine the given values
    #[error("Reducer '{reducer}' failed on field '{field}': {detail}")]
    Incompatible {
        /// Field being merged
        field: String,
        /// Reducer name
        reducer: String,
        /// What went wrong
        detail: String,
    },
}

/// Combines a field's current value with an incoming update
///
/// Implementations must be pure: no I/O, deterministic, and defined for a
/// current value of `null` (the unset representation).
pub trait Reducer: Send + Sync {
    /// Produce the new value for a field from its current value and an update
    ///
    /// `detail`-free success is the norm; errors describe the value shapes
    /// that could not be combined and are wrapped with field context by
    /// [`StateSchema::apply`].
    fn reduce(&self, current: &Value, update: &Value) -> Result<Value, String>;

    /// Reducer name, used in diagnostics
    fn name(&self) -> &str;
}

/// Last write wins
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceReducer;

impl Reducer for ReplaceReducer {
    fn reduce(&self, _current: &Value, update: &Value) -> Result<Value, String> {
        Ok(update.clone())
    }

    fn name(&self) -> &str {
        "replace"
    }
}

/// Concatenate onto an ordered list
///
/// The current value must be a list or unset; the update may be a list
/// (concatenated element-wise) or a single value (pushed).
#[derive(Debug, Clone, Copy, Default)]
pub struct AppendReducer;

impl Reducer for AppendReducer {
    fn reduce(&self, current: &Value, update: &Value) -> Result<Value, String> {
        let mut items = match current {
            Value::Array(existing) => existing.clone(),
            Value::Null => Vec::new(),
            other => {
                return Err(format!(
                    "current value must be a list or null, got {}",
                    type_name(other)
                ))
            }
        };
        match update {
            Value::Array(incoming) => items.extend(incoming.iter().cloned()),
            other => items.push(other.clone()),
        }
        Ok(Value::Array(items))
    }

    fn name(&self) -> &str {
        "append"
    }
}

/// Shallow object merge; incoming keys overwrite existing ones
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeReducer;

impl Reducer for MergeReducer {
    fn reduce(&self, current: &Value, update: &Value) -> Result<Value, String> {
        let mut merged = match current {
            Value::Object(existing) => existing.clone(),
            Value::Null => Map::new(),
            other => {
                return Err(format!(
                    "current value must be an object or null, got {}",
                    type_name(other)
                ))
            }
        };
        match update {
            Value::Object(incoming) => {
                for (k, v) in incoming {
                    merged.insert(k.clone(), v.clone());
                }
            }
            other => return Err(format!("update must be an object, got {}", type_name(other))),
        }
        Ok(Value::Object(merged))
    }

    fn name(&self) -> &str {
        "merge"
    }
}

/// Numeric accumulation; integers stay integers when both sides are integers
#[derive(Debug, Clone, Copy, Default)]
pub struct SumReducer;

impl Reducer for SumReducer {
    fn reduce(&self, current: &Value, update: &Value) -> Result<Value, String> {
        let zero = Value::from(0);
        let current = if current.is_null() { &zero } else { current };
        if let (Some(a), Some(b)) = (current.as_i64(), update.as_i64()) {
            return Ok(Value::from(a + b));
        }
        match (current.as_f64(), update.as_f64()) {
            (Some(a), Some(b)) => Ok(Value::from(a + b)),
            _ => Err(format!(
                "both values must be numeric, got {} and {}",
                type_name(current),
                type_name(update)
            )),
        }
    }

    fn name(&self) -> &str {
        "sum"
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

struct FieldSpec {
    reducer: Arc<dyn Reducer>,
    default: Value,
}

/// Declared shape of the shared state: field name to reducer and default
pub struct StateSchema {
    fields: HashMap<String, FieldSpec>,
}

impl StateSchema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
        }
    }

    /// Declare a field with the given reducer; the unset default is `null`
    pub fn with_field(mut self, name: impl Into<String>, reducer: impl Reducer + 'static) -> Self {
        self.fields.insert(
            name.into(),
            FieldSpec {
                reducer: Arc::new(reducer),
                default: Value::Null,
            },
        );
        self
    }

    /// Declare a field with a reducer and an explicit default value
    pub fn with_field_default(
        mut self,
        name: impl Into<String>,
        reducer: impl Reducer + 'static,
        default: Value,
    ) -> Self {
        self.fields.insert(
            name.into(),
            FieldSpec {
                reducer: Arc::new(reducer),
                default,
            },
        );
        self
    }

    /// Whether a field is declared
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// The state object a fresh thread starts from: every declared field at
    /// its default
    pub fn initial_state(&self) -> Value {
        let mut obj = Map::new();
        for (name, spec) in &self.fields {
            obj.insert(name.clone(), spec.default.clone());
        }
        Value::Object(obj)
    }

    /// Merge a partial update into `state` through the per-field reducers
    ///
    /// Pure with respect to everything but `state` itself, and atomic: if any
    /// field is undeclared or any reducer fails, `state` is left unmodified.
    /// Fields absent from the update are untouched; an empty update is a
    /// no-op.
    pub fn apply(&self, state: &mut Value, update: &Value) -> Result<(), SchemaError> {
        let update = match update {
            Value::Object(map) => map,
            other => {
                return Err(SchemaError::InvalidUpdate(format!(
                    "expected an object, got {}",
                    type_name(other)
                )))
            }
        };
        if update.is_empty() {
            return Ok(());
        }

        // Validate and reduce everything before touching the state.
        let mut reduced: Vec<(String, Value)> = Vec::with_capacity(update.len());
        for (field, incoming) in update {
            let spec = self
                .fields
                .get(field)
                .ok_or_else(|| SchemaError::UndeclaredField(field.clone()))?;
            let current = state
                .get(field)
                .cloned()
                .unwrap_or_else(|| spec.default.clone());
            let value = spec.reducer.reduce(&current, incoming).map_err(|detail| {
                SchemaError::Incompatible {
                    field: field.clone(),
                    reducer: spec.reducer.name().to_string(),
                    detail,
                }
            })?;
            reduced.push((field.clone(), value));
        }

        let obj = match state {
            Value::Object(map) => map,
            other => {
                *other = Value::Object(Map::new());
                match other {
                    Value::Object(map) => map,
                    _ => unreachable!(),
                }
            }
        };
        for (field, value) in reduced {
            obj.insert(field, value);
        }
        Ok(())
    }
}

impl Default for StateSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StateSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut fields: Vec<String> = self
            .fields
            .iter()
            .map(|(name, spec)| format!("{}: {}", name, spec.reducer.name()))
            .collect();
        fields.sort();
        f.debug_struct("StateSchema").field("fields", &fields).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> StateSchema {
        StateSchema::new()
            .with_field("summary", ReplaceReducer)
            .with_field("messages", AppendReducer)
            .with_field("tags", MergeReducer)
            .with_field_default("count", SumReducer, json!(0))
    }

    #[test]
    fn test_initial_state_uses_defaults() {
        let state = schema().initial_state();
        assert_eq!(state["summary"], Value::Null);
        assert_eq!(state["messages"], Value::Null);
        assert_eq!(state["count"], json!(0));
    }

    #[test]
    fn test_replace_overwrites() {
        let mut state = schema().initial_state();
        schema()
            .apply(&mut state, &json!({"summary": "first"}))
            .unwrap();
        schema()
            .apply(&mut state, &json!({"summary": "second"}))
            .unwrap();
        assert_eq!(state["summary"], json!("second"));
    }

    #[test]
    fn test_append_concatenates_in_order() {
        let s = schema();
        let mut state = s.initial_state();
        s.apply(&mut state, &json!({"messages": ["a", "b"]})).unwrap();
        s.apply(&mut state, &json!({"messages": ["c"]})).unwrap();
        assert_eq!(state["messages"], json!(["a", "b", "c"]));
    }

    #[test]
    fn test_append_accepts_scalar_update() {
        let s = schema();
        let mut state = s.initial_state();
        s.apply(&mut state, &json!({"messages": "solo"})).unwrap();
        assert_eq!(state["messages"], json!(["solo"]));
    }

    #[test]
    fn test_append_rejects_non_list_current() {
        let current = json!("not a list");
        let err = AppendReducer.reduce(&current, &json!(["x"])).unwrap_err();
        assert!(err.contains("list"));
    }

    #[test]
    fn test_merge_shallow() {
        let s = schema();
        let mut state = s.initial_state();
        s.apply(&mut state, &json!({"tags": {"env": "dev", "tier": 1}}))
            .unwrap();
        s.apply(&mut state, &json!({"tags": {"env": "prod"}})).unwrap();
        assert_eq!(state["tags"], json!({"env": "prod", "tier": 1}));
    }

    #[test]
    fn test_sum_accumulates_integers() {
        let s = schema();
        let mut state = s.initial_state();
        s.apply(&mut state, &json!({"count": 3})).unwrap();
        s.apply(&mut state, &json!({"count": 4})).unwrap();
        assert_eq!(state["count"], json!(7));
    }

    #[test]
    fn test_sum_mixes_floats() {
        let result = SumReducer.reduce(&json!(1.5), &json!(2)).unwrap();
        assert_eq!(result, json!(3.5));
    }

    #[test]
    fn test_undeclared_field_rejected_and_state_untouched() {
        let s = schema();
        let mut state = s.initial_state();
        s.apply(&mut state, &json!({"messages": ["kept"]})).unwrap();
        let before = state.clone();

        let err = s
            .apply(&mut state, &json!({"messages": ["lost"], "bogus": 1}))
            .unwrap_err();
        assert_eq!(err, SchemaError::UndeclaredField("bogus".to_string()));
        assert_eq!(state, before);
    }

    #[test]
    fn test_non_object_update_rejected() {
        let s = schema();
        let mut state = s.initial_state();
        let err = s.apply(&mut state, &json!(["not", "an", "object"])).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidUpdate(_)));
    }

    #[test]
    fn test_empty_update_is_noop() {
        let s = schema();
        let mut state = s.initial_state();
        let before = state.clone();
        s.apply(&mut state, &json!({})).unwrap();
        assert_eq!(state, before);
    }
}
