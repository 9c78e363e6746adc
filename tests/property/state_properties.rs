//! Property-based tests for the reducer, the derived views and pagination.
//!
//! Uses proptest to verify:
//! 1. `reduce` is deterministic and never mutates its input.
//! 2. `outstanding` and `completed` partition `all_tasks`, preserving order.
//! 3. Deleting the same id twice equals deleting it once.
//! 4. A created task never duplicates an id already in the collection.
//! 5. Page windows never show more than seven page numbers and always show
//!    the current, first and last pages; up to seven pages are all shown.

use std::collections::HashSet;

use proptest::prelude::*;
use tasker::intent::Intent;
use tasker::paging::{PageItem, page_window};
use tasker::store::{TaskState, reduce};
use tasker::views;
use tasker_proto::task::{Priority, Task, TaskId, TaskPatch};

// --- Strategies ---

fn arb_priority() -> impl Strategy<Value = Priority> {
    prop_oneof![
        Just(Priority::Low),
        Just(Priority::Medium),
        Just(Priority::High)
    ]
}

fn arb_task() -> impl Strategy<Value = Task> {
    ("[0-9]{1,3}", "[a-zA-Z ]{3,20}", any::<bool>(), arb_priority()).prop_map(
        |(id, title, is_done, priority)| Task {
            id: TaskId::new(id),
            title,
            is_done,
            priority,
        },
    )
}

fn arb_state() -> impl Strategy<Value = TaskState> {
    (
        prop::collection::vec(arb_task(), 0..20),
        any::<bool>(),
        prop::option::of("[a-z ]{1,20}"),
    )
        .prop_map(|(tasks, loading, error)| TaskState {
            tasks,
            loading,
            error,
        })
}

/// A state whose ids are unique, as every state built from a well-behaved
/// store is.
fn arb_unique_state() -> impl Strategy<Value = TaskState> {
    arb_state().prop_map(|mut state| {
        let mut seen = HashSet::new();
        state.tasks.retain(|t| seen.insert(t.id.clone()));
        state
    })
}

fn arb_intent() -> impl Strategy<Value = Intent> {
    let error = "[a-z ]{1,20}";
    let commands = prop_oneof![
        Just(Intent::Load),
        ("[a-z ]{3,20}", arb_priority())
            .prop_map(|(title, priority)| Intent::Create { title, priority }),
        ("[0-9]{1,3}", any::<bool>()).prop_map(|(id, done)| Intent::Update {
            id: TaskId::new(id),
            patch: TaskPatch::default().done(done),
        }),
        "[0-9]{1,3}".prop_map(|id| Intent::Delete { id: TaskId::new(id) }),
    ];
    let successes = prop_oneof![
        prop::collection::vec(arb_task(), 0..10).prop_map(|tasks| Intent::LoadSucceeded { tasks }),
        arb_task().prop_map(|task| Intent::CreateSucceeded { task }),
        arb_task().prop_map(|task| Intent::UpdateSucceeded { task }),
        "[0-9]{1,3}".prop_map(|id| Intent::DeleteSucceeded { id: TaskId::new(id) }),
    ];
    let failures = prop_oneof![
        error.prop_map(|error| Intent::LoadFailed { error }),
        error.prop_map(|error| Intent::CreateFailed { error }),
        error.prop_map(|error| Intent::UpdateFailed { error }),
        error.prop_map(|error| Intent::DeleteFailed { error }),
    ];
    prop_oneof![commands, successes, failures]
}

// --- Properties ---

proptest! {
    #[test]
    fn reduce_is_deterministic(state in arb_state(), intent in arb_intent()) {
        let original = state.clone();
        let a = reduce(state.clone(), &intent);
        let b = reduce(state.clone(), &intent);
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(state, original);
    }

    #[test]
    fn views_partition_all_tasks(
        state in arb_state(),
        intents in prop::collection::vec(arb_intent(), 0..10),
    ) {
        let state = intents.iter().fold(state, reduce);
        let all = views::all_tasks(&state);
        let outstanding = views::outstanding(&state);
        let completed = views::completed(&state);

        prop_assert_eq!(outstanding.len() + completed.len(), all.len());
        prop_assert!(outstanding.iter().all(|t| !t.is_done));
        prop_assert!(completed.iter().all(|t| t.is_done));

        let expected_open: Vec<&Task> = all.iter().filter(|t| !t.is_done).collect();
        prop_assert_eq!(outstanding, expected_open);
    }

    #[test]
    fn delete_succeeded_is_idempotent(state in arb_state(), id in "[0-9]{1,3}") {
        let intent = Intent::DeleteSucceeded { id: TaskId::new(id.clone()) };
        let once = reduce(state, &intent);
        let twice = reduce(once.clone(), &intent);
        prop_assert_eq!(&once, &twice);
        prop_assert!(once.tasks.iter().all(|t| t.id.as_str() != id));
    }

    #[test]
    fn create_succeeded_keeps_ids_unique(state in arb_unique_state(), task in arb_task()) {
        let is_new = state.tasks.iter().all(|t| t.id != task.id);
        let next = reduce(state.clone(), &Intent::CreateSucceeded { task: task.clone() });

        let ids: HashSet<&TaskId> = next.tasks.iter().map(|t| &t.id).collect();
        prop_assert_eq!(ids.len(), next.tasks.len());
        prop_assert_eq!(next.tasks.iter().filter(|t| **t == task).count(), 1);
        if is_new {
            let mut expected = state.tasks;
            expected.push(task);
            prop_assert_eq!(next.tasks, expected);
        } else {
            prop_assert_eq!(next.tasks.len(), state.tasks.len());
        }
    }

    #[test]
    fn command_intents_other_than_load_leave_state(state in arb_state(), intent in arb_intent()) {
        if matches!(intent, Intent::Create { .. } | Intent::Update { .. } | Intent::Delete { .. }) {
            prop_assert_eq!(reduce(state.clone(), &intent), state);
        }
    }

    #[test]
    fn page_window_is_bounded(total in 1usize..500, current_seed in any::<usize>()) {
        let current = current_seed % total + 1;
        let window = page_window(total, current);
        let pages: Vec<usize> = window
            .iter()
            .filter_map(|item| match item {
                PageItem::Page(n) => Some(*n),
                PageItem::Ellipsis => None,
            })
            .collect();

        prop_assert!(pages.len() <= 7);
        if total <= 7 {
            prop_assert_eq!(&pages, &(1..=total).collect::<Vec<_>>());
        }
        prop_assert!(pages.contains(&current));
        prop_assert_eq!(pages.first().copied(), Some(1));
        prop_assert_eq!(pages.last().copied(), Some(total));
        prop_assert!(pages.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(!window.windows(2).any(|w| matches!(w, [PageItem::Ellipsis, PageItem::Ellipsis])));
    }
}
