//! Property tests for the reducer merge laws

use proptest::collection::vec;
use proptest::prelude::*;
use serde_json::json;
use trellis_core::schema::{AppendReducer, ReplaceReducer, StateSchema, SumReducer};

proptest! {
    // Appending a then b always yields the concatenation of a then b, in
    // order, regardless of what was already present.
    #[test]
    fn append_concatenates_in_order(
        seed in vec(any::<i64>(), 0..6),
        a in vec(any::<i64>(), 0..6),
        b in vec(any::<i64>(), 0..6),
    ) {
        let schema = StateSchema::new().with_field("xs", AppendReducer);
        let mut state = schema.initial_state();
        schema.apply(&mut state, &json!({"xs": seed.clone()})).unwrap();
        schema.apply(&mut state, &json!({"xs": a.clone()})).unwrap();
        schema.apply(&mut state, &json!({"xs": b.clone()})).unwrap();

        let expected: Vec<i64> = seed.iter().chain(a.iter()).chain(b.iter()).copied().collect();
        prop_assert_eq!(&state["xs"], &json!(expected));
    }

    // Under replace, only the final write is visible.
    #[test]
    fn replace_last_write_wins(writes in vec(any::<i32>(), 1..10)) {
        let schema = StateSchema::new().with_field("flag", ReplaceReducer);
        let mut state = schema.initial_state();
        for w in &writes {
            schema.apply(&mut state, &json!({"flag": w})).unwrap();
        }
        let last = writes[writes.len() - 1];
        prop_assert_eq!(&state["flag"], &json!(last));
    }

    // Sum accumulates to the total of all updates, in any order.
    #[test]
    fn sum_accumulates_total(updates in vec(-1000i64..1000, 0..10)) {
        let schema = StateSchema::new().with_field_default("count", SumReducer, json!(0));
        let mut state = schema.initial_state();
        for u in &updates {
            schema.apply(&mut state, &json!({"count": u})).unwrap();
        }
        let total: i64 = updates.iter().sum();
        prop_assert_eq!(&state["count"], &json!(total));
    }

    // Merging never invents or drops sibling fields.
    #[test]
    fn apply_touches_only_updated_fields(flag in any::<bool>()) {
        let schema = StateSchema::new()
            .with_field("touched", ReplaceReducer)
            .with_field_default("untouched", ReplaceReducer, json!("sentinel"));
        let mut state = schema.initial_state();
        schema.apply(&mut state, &json!({"touched": flag})).unwrap();
        prop_assert_eq!(&state["untouched"], &json!("sentinel"));
        prop_assert_eq!(&state["touched"], &json!(flag));
    }
}
