//! In-memory remote store for tests and offline runs.
//!
//! Behaves like the HTTP store: ids are assigned by the store, unknown ids
//! answer 404, and a replace overwrites (or re-inserts) the record blindly.
//! Each call's response is computed when the call starts and handed back
//! after the configured latency, like a response in transit. Individual
//! operations can be made to fail, or the whole store taken offline.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use tasker_proto::task::{NewTask, Task, TaskId};

use super::{RemoteError, RemoteStore};

/// One of the five remote operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOp {
    /// `GET /tasks`.
    List,
    /// `GET /tasks/{id}`.
    Get,
    /// `POST /tasks`.
    Create,
    /// `PUT /tasks/{id}`.
    Replace,
    /// `DELETE /tasks/{id}`.
    Delete,
}

impl RemoteOp {
    const fn method(self) -> &'static str {
        match self {
            Self::List | Self::Get => "GET",
            Self::Create => "POST",
            Self::Replace => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// In-process task store.
#[derive(Debug, Default)]
pub struct InMemoryRemote {
    tasks: Mutex<Vec<Task>>,
    next_id: AtomicU64,
    latency: Mutex<Duration>,
    failing: Mutex<HashSet<RemoteOp>>,
    offline: AtomicBool,
    calls: Mutex<Vec<RemoteOp>>,
}

impl InMemoryRemote {
    /// Creates an empty store with no latency.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `tasks`.
    #[must_use]
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let remote = Self::new();
        remote.seed(tasks);
        remote
    }

    /// Replaces the stored collection, bypassing latency and failures.
    pub fn seed(&self, tasks: Vec<Task>) {
        *self.tasks.lock() = tasks;
    }

    /// Current stored collection.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.lock().clone()
    }

    /// Delay applied to every call from now on.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = latency;
    }

    /// Makes every later `op` call fail with a 500.
    pub fn fail(&self, op: RemoteOp) {
        self.failing.lock().insert(op);
    }

    /// Undoes [`fail`](Self::fail).
    pub fn recover(&self, op: RemoteOp) {
        self.failing.lock().remove(&op);
    }

    /// While offline every call fails as if the store were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }

    /// Every operation called so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<RemoteOp> {
        self.calls.lock().clone()
    }

    /// Number of times `op` was called.
    #[must_use]
    pub fn call_count(&self, op: RemoteOp) -> usize {
        self.calls.lock().iter().filter(|c| **c == op).count()
    }

    fn assign_id(&self, tasks: &[Task]) -> TaskId {
        loop {
            let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
            let id = TaskId::new(n.to_string());
            if !tasks.iter().any(|t| t.id == id) {
                return id;
            }
        }
    }

    fn not_found(op: RemoteOp, id: &TaskId) -> RemoteError {
        RemoteError::Status {
            method: op.method(),
            path: format!("/tasks/{id}"),
            status: 404,
        }
    }

    /// Records the call and computes its result against the current data.
    fn handle<T>(
        &self,
        op: RemoteOp,
        path: &str,
        f: impl FnOnce(&mut Vec<Task>) -> Result<T, RemoteError>,
    ) -> Result<T, RemoteError> {
        self.calls.lock().push(op);
        if self.offline.load(Ordering::Relaxed) {
            return Err(RemoteError::Unavailable(format!("{} {path}", op.method())));
        }
        if self.failing.lock().contains(&op) {
            return Err(RemoteError::Status {
                method: op.method(),
                path: path.to_string(),
                status: 500,
            });
        }
        f(&mut self.tasks.lock())
    }

    async fn deliver<T>(&self, result: Result<T, RemoteError>) -> Result<T, RemoteError> {
        let latency = *self.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        result
    }
}

impl RemoteStore for InMemoryRemote {
    async fn list(&self) -> Result<Vec<Task>, RemoteError> {
        let result = self.handle(RemoteOp::List, "/tasks", |tasks| Ok(tasks.clone()));
        self.deliver(result).await
    }

    async fn get(&self, id: &TaskId) -> Result<Task, RemoteError> {
        let result = self.handle(RemoteOp::Get, &format!("/tasks/{id}"), |tasks| {
            tasks
                .iter()
                .find(|t| t.id == *id)
                .cloned()
                .ok_or_else(|| Self::not_found(RemoteOp::Get, id))
        });
        self.deliver(result).await
    }

    async fn create(&self, task: &NewTask) -> Result<Task, RemoteError> {
        let result = self.handle(RemoteOp::Create, "/tasks", |tasks| {
            let created = task.clone().with_id(self.assign_id(tasks));
            tasks.push(created.clone());
            Ok(created)
        });
        self.deliver(result).await
    }

    async fn replace(&self, task: &Task) -> Result<Task, RemoteError> {
        let result = self.handle(RemoteOp::Replace, &format!("/tasks/{}", task.id), |tasks| {
            if let Some(existing) = tasks.iter_mut().find(|t| t.id == task.id) {
                existing.clone_from(task);
            } else {
                tasks.push(task.clone());
            }
            Ok(task.clone())
        });
        self.deliver(result).await
    }

    async fn delete(&self, id: &TaskId) -> Result<(), RemoteError> {
        let result = self.handle(RemoteOp::Delete, &format!("/tasks/{id}"), |tasks| {
            let before = tasks.len();
            tasks.retain(|t| t.id != *id);
            if tasks.len() == before {
                Err(Self::not_found(RemoteOp::Delete, id))
            } else {
                Ok(())
            }
        });
        self.deliver(result).await
    }
}
