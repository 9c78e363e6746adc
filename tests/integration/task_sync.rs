//! Integration tests for the sync engine against the HTTP task server.
//!
//! Each test starts an in-process `tasker-server` on an OS-assigned port and
//! drives a `SyncEngine<HttpRemote>` against it.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::similar_names)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tasker::intent::{CommandKind, Intent};
use tasker::notify::{NotificationCenter, NotificationTtls, Severity};
use tasker::remote::http::{DEFAULT_REQUEST_TIMEOUT, HttpRemote};
use tasker::store::StateStore;
use tasker::sync::SyncEngine;
use tasker::views;
use tasker_proto::task::{Priority, Task, TaskId, TaskPatch};
use tasker_server::api;
use tasker_server::store::TaskStore;

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Starts a task server preloaded with `tasks`.
async fn start_server(tasks: Vec<Task>) -> (SocketAddr, Arc<TaskStore>) {
    let store = Arc::new(TaskStore::with_tasks(tasks));
    let (addr, _handle) = api::start_server_with_state("127.0.0.1:0", Arc::clone(&store))
        .await
        .expect("failed to start task server");
    (addr, store)
}

/// Creates an engine talking to the server at `addr`.
fn make_engine(addr: SocketAddr) -> SyncEngine<HttpRemote> {
    let remote = HttpRemote::new(&format!("http://{addr}"), DEFAULT_REQUEST_TIMEOUT).unwrap();
    SyncEngine::new(remote)
}

fn make_task(id: &str, title: &str, is_done: bool, priority: Priority) -> Task {
    Task {
        id: TaskId::new(id),
        title: title.to_string(),
        is_done,
        priority,
    }
}

fn notices(engine: &SyncEngine<HttpRemote>) -> Vec<(Severity, String)> {
    engine
        .notifications()
        .notifications()
        .into_iter()
        .map(|n| (n.severity, n.message))
        .collect()
}

// ===========================================================================
// Load
// ===========================================================================

#[tokio::test]
async fn load_fetches_collection_in_store_order() {
    let (addr, _store) = start_server(vec![
        make_task("1", "Buy milk", false, Priority::Low),
        make_task("2", "Walk dog", true, Priority::High),
        make_task("3", "File taxes", false, Priority::Medium),
    ])
    .await;
    let engine = make_engine(addr);

    engine.load();
    engine.settle().await;

    let state = engine.state();
    assert!(!views::is_loading(&state));
    let ids: Vec<&str> = views::all_tasks(&state).iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["1", "2", "3"]);
    assert_eq!(views::outstanding(&state).len(), 2);
    assert_eq!(views::completed(&state).len(), 1);
    assert!(notices(&engine).is_empty());
}

#[tokio::test]
async fn load_against_dead_server_fails_softly() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let engine = make_engine(addr);

    engine.load();
    engine.settle().await;

    let state = engine.state();
    assert!(!state.loading);
    assert!(state.tasks.is_empty());
    assert!(views::last_error(&state).is_some());
    assert_eq!(
        notices(&engine),
        [(
            Severity::Error,
            "Failed to load tasks. Please check your connection and try again.".to_string()
        )]
    );
}

#[tokio::test]
async fn second_load_supersedes_first() {
    let (addr, _store) = start_server(vec![make_task("1", "Buy milk", false, Priority::Low)]).await;
    let engine = make_engine(addr);
    let mut intents = engine.subscribe_intents();

    engine.load();
    engine.load();
    engine.settle().await;

    let mut outcomes = 0;
    while let Ok(intent) = intents.try_recv() {
        if intent.answers() == Some(CommandKind::Load) {
            outcomes += 1;
        }
    }
    assert_eq!(outcomes, 1);
    assert_eq!(engine.state().tasks.len(), 1);
    assert!(!engine.is_in_flight(CommandKind::Load));
}

// ===========================================================================
// Create / update / delete
// ===========================================================================

#[tokio::test]
async fn create_then_load_reflects_task() {
    let (addr, store) = start_server(vec![]).await;
    let engine = make_engine(addr);

    engine.create("Buy milk", Priority::Low).unwrap();
    engine.settle().await;
    assert_eq!(
        notices(&engine),
        [(Severity::Success, "Task created successfully!".to_string())]
    );

    engine.load();
    engine.settle().await;

    let state = engine.state();
    assert_eq!(state.tasks.len(), 1);
    let task = &state.tasks[0];
    assert_eq!(task.title, "Buy milk");
    assert!(!task.is_done);
    assert_eq!(task.priority, Priority::Low);
    assert_eq!(store.list().await, state.tasks);
}

#[tokio::test]
async fn update_merges_partial_fields() {
    let (addr, store) = start_server(vec![make_task("1", "Buy milk", false, Priority::Low)]).await;
    let engine = make_engine(addr);
    engine.load();
    engine.settle().await;

    engine
        .update(TaskId::new("1"), TaskPatch::default().done(true))
        .unwrap();
    engine.settle().await;

    let expected = make_task("1", "Buy milk", true, Priority::Low);
    assert_eq!(engine.state().tasks, [expected.clone()]);
    assert_eq!(store.get(&TaskId::new("1")).await, Some(expected));
    assert_eq!(
        notices(&engine),
        [(Severity::Success, "Task updated successfully!".to_string())]
    );
}

#[tokio::test]
async fn update_of_missing_task_writes_nothing() {
    let (addr, store) = start_server(vec![]).await;
    let engine = make_engine(addr);

    engine
        .update(TaskId::new("9"), TaskPatch::default().title("Renamed"))
        .unwrap();
    engine.settle().await;

    assert!(store.is_empty().await);
    assert!(engine.state().error.is_some());
    assert_eq!(
        notices(&engine),
        [(
            Severity::Error,
            "Failed to update task. Please try again.".to_string()
        )]
    );
}

#[tokio::test]
async fn failed_delete_leaves_state_intact() {
    let (addr, _store) = start_server(vec![make_task("1", "Buy milk", false, Priority::Low)]).await;
    let engine = make_engine(addr);
    engine.load();
    engine.settle().await;
    let before = engine.state().tasks;

    engine.delete(TaskId::new("missing"));
    engine.settle().await;

    let state = engine.state();
    assert_eq!(state.tasks, before);
    assert!(state.error.as_deref().unwrap().contains("404"));
    assert_eq!(
        notices(&engine),
        [(
            Severity::Error,
            "Failed to delete task. Please try again.".to_string()
        )]
    );
}

#[tokio::test]
async fn delete_removes_task_everywhere() {
    let (addr, store) = start_server(vec![
        make_task("1", "Buy milk", false, Priority::Low),
        make_task("2", "Walk dog", false, Priority::High),
    ])
    .await;
    let engine = make_engine(addr);
    engine.load();
    engine.settle().await;

    engine.delete(TaskId::new("1"));
    engine.settle().await;

    assert_eq!(engine.state().tasks.len(), 1);
    assert_eq!(engine.state().tasks[0].id.as_str(), "2");
    assert_eq!(store.len().await, 1);
}

// ===========================================================================
// Observation
// ===========================================================================

#[tokio::test]
async fn intents_and_state_are_observable() {
    let (addr, _store) = start_server(vec![]).await;
    let engine = make_engine(addr);
    let mut intents = engine.subscribe_intents();
    let mut state_rx = engine.subscribe();

    engine.create("Buy milk", Priority::Medium).unwrap();
    engine.settle().await;

    let first = intents.try_recv().unwrap();
    assert_eq!(
        first,
        Intent::Create {
            title: "Buy milk".to_string(),
            priority: Priority::Medium,
        }
    );
    assert!(matches!(
        intents.try_recv().unwrap(),
        Intent::CreateSucceeded { .. }
    ));
    assert!(state_rx.has_changed().unwrap());
    assert_eq!(state_rx.borrow_and_update().tasks.len(), 1);
}

#[tokio::test]
async fn outcome_notifications_expire() {
    let (addr, _store) = start_server(vec![]).await;
    let remote = HttpRemote::new(&format!("http://{addr}"), DEFAULT_REQUEST_TIMEOUT).unwrap();
    let ttls = NotificationTtls {
        info: Duration::from_millis(50),
        success: Duration::from_millis(50),
        warning: Duration::from_millis(50),
        error: Duration::from_millis(50),
    };
    let engine = SyncEngine::with_parts(
        Arc::new(remote),
        Arc::new(StateStore::new()),
        NotificationCenter::with_ttls(ttls),
    );

    engine.create("Buy milk", Priority::Low).unwrap();
    engine.settle().await;
    assert_eq!(engine.notifications().notifications().len(), 1);

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(engine.notifications().notifications().is_empty());
    assert_eq!(engine.notifications().pending_timers(), 0);
}
