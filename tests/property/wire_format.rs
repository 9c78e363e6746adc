//! Property-based tests for the task wire format and patch merging.
//!
//! Uses proptest to verify:
//! 1. Task JSON always uses the `{id, title, isDone, priority}` shape.
//! 2. Merging a patch keeps the id and touches only the fields present.
//! 3. Arbitrary strings never deserialize into an unknown priority.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;
use serde_json::Value;
use tasker_proto::task::{Priority, Task, TaskId, TaskPatch};

/// Strategy for generating arbitrary `Priority` values.
fn arb_priority() -> impl Strategy<Value = Priority> {
    prop_oneof![
        Just(Priority::Low),
        Just(Priority::Medium),
        Just(Priority::High)
    ]
}

/// Strategy for generating arbitrary `Task` values.
fn arb_task() -> impl Strategy<Value = Task> {
    ("[a-z0-9-]{1,16}", "[^\x00]{1,64}", any::<bool>(), arb_priority()).prop_map(
        |(id, title, is_done, priority)| Task {
            id: TaskId::new(id),
            title,
            is_done,
            priority,
        },
    )
}

/// Strategy for generating arbitrary `TaskPatch` values.
fn arb_patch() -> impl Strategy<Value = TaskPatch> {
    (
        prop::option::of("[^\x00]{1,64}"),
        prop::option::of(any::<bool>()),
        prop::option::of(arb_priority()),
    )
        .prop_map(|(title, is_done, priority)| TaskPatch {
            title,
            is_done,
            priority,
        })
}

proptest! {
    #[test]
    fn task_json_has_wire_shape(task in arb_task()) {
        let value = serde_json::to_value(&task).unwrap();
        let obj = value.as_object().unwrap();
        prop_assert_eq!(obj.len(), 4);
        prop_assert_eq!(obj.get("id"), Some(&Value::String(task.id.to_string())));
        prop_assert_eq!(obj.get("isDone"), Some(&Value::Bool(task.is_done)));
        prop_assert_eq!(
            obj.get("priority"),
            Some(&Value::String(task.priority.to_string()))
        );
        let decoded: Task = serde_json::from_value(value).unwrap();
        prop_assert_eq!(decoded, task);
    }

    #[test]
    fn patch_preserves_id_and_untouched_fields(task in arb_task(), patch in arb_patch()) {
        let merged = task.patched(&patch);
        prop_assert_eq!(&merged.id, &task.id);
        prop_assert_eq!(&merged.title, patch.title.as_ref().unwrap_or(&task.title));
        prop_assert_eq!(merged.is_done, patch.is_done.unwrap_or(task.is_done));
        prop_assert_eq!(merged.priority, patch.priority.unwrap_or(task.priority));
    }

    #[test]
    fn patch_application_is_idempotent(task in arb_task(), patch in arb_patch()) {
        let once = task.patched(&patch);
        let twice = once.patched(&patch);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn unknown_priority_strings_are_rejected(s in "[a-z]{1,12}") {
        prop_assume!(s != "low" && s != "medium" && s != "high");
        let json = format!(r#"{{"id":"1","title":"abc","isDone":false,"priority":"{s}"}}"#);
        prop_assert!(serde_json::from_str::<Task>(&json).is_err());
    }
}

#[test]
fn patch_serializes_only_present_fields() {
    let patch = TaskPatch::default().done(true);
    assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"isDone":true}"#);
}

#[test]
fn decodes_store_payload() {
    let json = r#"[{"id":"t1","title":"Buy milk","isDone":false,"priority":"low"}]"#;
    let tasks: Vec<Task> = serde_json::from_str(json).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, TaskId::new("t1"));
    assert_eq!(tasks[0].priority, Priority::Low);
}
