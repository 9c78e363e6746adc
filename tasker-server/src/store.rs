//! In-memory task collection.
//!
//! Tasks are kept in insertion order. Ids come from a counter (`"1"`, `"2"`,
//! ...) that skips ids already present, so seeded data never collides with
//! new records.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

use tasker_proto::task::{NewTask, Task, TaskId};

/// The server's task collection.
pub struct TaskStore {
    tasks: RwLock<Vec<Task>>,
    next_id: AtomicU64,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tasks(Vec::new())
    }

    /// Creates a store preloaded with `tasks`.
    #[must_use]
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: RwLock::new(tasks),
            next_id: AtomicU64::new(0),
        }
    }

    /// Every task, in insertion order.
    pub async fn list(&self) -> Vec<Task> {
        self.tasks.read().await.clone()
    }

    /// The task stored under `id`.
    pub async fn get(&self, id: &TaskId) -> Option<Task> {
        self.tasks.read().await.iter().find(|t| t.id == *id).cloned()
    }

    /// Appends a task under a fresh id and returns it.
    pub async fn create(&self, new_task: NewTask) -> Task {
        let mut tasks = self.tasks.write().await;
        let id = loop {
            let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
            let id = TaskId::new(n.to_string());
            if !tasks.iter().any(|t| t.id == id) {
                break id;
            }
        };
        let task = new_task.with_id(id);
        tasks.push(task.clone());
        drop(tasks);
        tracing::debug!(id = %task.id, "task created");
        task
    }

    /// Stores `task` under `id`, overwriting an existing record in place or
    /// appending a new one. The id in the path wins over the body's.
    pub async fn replace(&self, id: TaskId, mut task: Task) -> Task {
        task.id = id;
        let mut tasks = self.tasks.write().await;
        if let Some(existing) = tasks.iter_mut().find(|t| t.id == task.id) {
            existing.clone_from(&task);
        } else {
            tracing::debug!(id = %task.id, "replace inserted a missing task");
            tasks.push(task.clone());
        }
        task
    }

    /// Removes the task under `id`. Returns `false` if there was none.
    pub async fn delete(&self, id: &TaskId) -> bool {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|t| t.id != *id);
        tasks.len() != before
    }

    /// Number of stored tasks.
    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    /// Returns `true` if no tasks are stored.
    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }
}
