//! The synchronization engine.
//!
//! [`SyncEngine`] accepts intents, applies them to the [`StateStore`] and,
//! for command intents, runs the matching remote call in a background task.
//! When the call finishes it applies the outcome intent and posts a
//! notification.
//!
//! Each [`CommandKind`] owns one slot. A new command of a kind aborts the
//! task still running in its slot, and a per-slot generation number makes
//! sure a result that raced the abort is discarded. Different kinds never
//! cancel each other and may complete in any order.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use tasker_proto::task::{NewTask, Priority, TaskId, TaskPatch, ValidationError, validate_title};

use crate::intent::{CommandKind, Intent};
use crate::notify::{NotificationCenter, Severity};
use crate::remote::RemoteStore;
use crate::store::{StateStore, TaskState};

const LOAD_FAILED: &str = "Failed to load tasks. Please check your connection and try again.";
const CREATE_SUCCEEDED: &str = "Task created successfully!";
const CREATE_FAILED: &str = "Failed to create task. Please try again.";
const UPDATE_SUCCEEDED: &str = "Task updated successfully!";
const UPDATE_FAILED: &str = "Failed to update task. Please try again.";
const DELETE_SUCCEEDED: &str = "Task deleted successfully!";
const DELETE_FAILED: &str = "Failed to delete task. Please try again.";

/// Errors returned by the typed engine helpers.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EngineError {
    /// User input was rejected before anything was dispatched.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
}

/// The remote work behind a command intent.
#[derive(Debug)]
enum Command {
    Load,
    Create(NewTask),
    Update { id: TaskId, patch: TaskPatch },
    Delete(TaskId),
}

impl Command {
    fn from_intent(intent: &Intent) -> Option<Self> {
        match intent {
            Intent::Load => Some(Self::Load),
            Intent::Create { title, priority } => {
                Some(Self::Create(NewTask::new(title.clone(), *priority)))
            }
            Intent::Update { id, patch } => Some(Self::Update {
                id: id.clone(),
                patch: patch.clone(),
            }),
            Intent::Delete { id } => Some(Self::Delete(id.clone())),
            _ => None,
        }
    }
}

/// Result of a finished remote call: the outcome intent and what to tell
/// the user about it.
struct Outcome {
    intent: Intent,
    notice: Option<(Severity, &'static str)>,
}

impl Outcome {
    const fn ok(intent: Intent, message: &'static str) -> Self {
        Self {
            intent,
            notice: Some((Severity::Success, message)),
        }
    }

    const fn failed(intent: Intent, message: &'static str) -> Self {
        Self {
            intent,
            notice: Some((Severity::Error, message)),
        }
    }
}

async fn execute<R: RemoteStore>(remote: &R, command: Command) -> Outcome {
    match command {
        Command::Load => match remote.list().await {
            Ok(tasks) => {
                tracing::info!(count = tasks.len(), "tasks loaded");
                Outcome {
                    intent: Intent::LoadSucceeded { tasks },
                    notice: None,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "load failed");
                Outcome::failed(Intent::LoadFailed { error: e.to_string() }, LOAD_FAILED)
            }
        },
        Command::Create(new_task) => match remote.create(&new_task).await {
            Ok(task) => {
                tracing::info!(id = %task.id, "task created");
                Outcome::ok(Intent::CreateSucceeded { task }, CREATE_SUCCEEDED)
            }
            Err(e) => {
                tracing::warn!(error = %e, "create failed");
                Outcome::failed(Intent::CreateFailed { error: e.to_string() }, CREATE_FAILED)
            }
        },
        Command::Update { id, patch } => {
            // Read-before-write: the store only accepts full records.
            let current = match remote.get(&id).await {
                Ok(task) => task,
                Err(e) => {
                    tracing::warn!(%id, error = %e, "update read failed");
                    return Outcome::failed(
                        Intent::UpdateFailed { error: e.to_string() },
                        UPDATE_FAILED,
                    );
                }
            };
            match remote.replace(&current.patched(&patch)).await {
                Ok(task) => {
                    tracing::info!(%id, "task updated");
                    Outcome::ok(Intent::UpdateSucceeded { task }, UPDATE_SUCCEEDED)
                }
                Err(e) => {
                    tracing::warn!(%id, error = %e, "update write failed");
                    Outcome::failed(Intent::UpdateFailed { error: e.to_string() }, UPDATE_FAILED)
                }
            }
        }
        Command::Delete(id) => match remote.delete(&id).await {
            Ok(()) => {
                tracing::info!(%id, "task deleted");
                Outcome::ok(Intent::DeleteSucceeded { id }, DELETE_SUCCEEDED)
            }
            Err(e) => {
                tracing::warn!(%id, error = %e, "delete failed");
                Outcome::failed(Intent::DeleteFailed { error: e.to_string() }, DELETE_FAILED)
            }
        },
    }
}

#[derive(Default)]
struct Slot {
    generation: u64,
    task: Option<JoinHandle<()>>,
}

/// Decrements the in-flight counter when a slot task ends, aborted or not.
struct InFlight(Arc<watch::Sender<usize>>);

impl InFlight {
    fn enter(counter: &Arc<watch::Sender<usize>>) -> Self {
        counter.send_modify(|n| *n += 1);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.send_modify(|n| *n = n.saturating_sub(1));
    }
}

struct Inner<R> {
    remote: Arc<R>,
    store: Arc<StateStore>,
    notifications: NotificationCenter,
    slots: Mutex<[Slot; 4]>,
    in_flight: Arc<watch::Sender<usize>>,
}

impl<R: RemoteStore> Inner<R> {
    fn finish(&self, kind: CommandKind, generation: u64, outcome: Outcome) {
        {
            let mut slots = self.slots.lock();
            let slot = &mut slots[kind.index()];
            if slot.generation != generation {
                tracing::debug!(%kind, generation, "discarding superseded result");
                return;
            }
            slot.task = None;
            self.store.apply(&outcome.intent);
        }
        if let Some((severity, message)) = outcome.notice {
            let ttl = self.notifications.ttls().for_severity(severity);
            self.notifications.post(message, severity, ttl);
        }
    }
}

/// Drives task state from intents and keeps it in step with the remote
/// store. Cheap to clone; clones share everything.
///
/// Command dispatch spawns Tokio tasks, so it must happen inside a runtime.
pub struct SyncEngine<R> {
    inner: Arc<Inner<R>>,
}

impl<R> Clone for SyncEngine<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> fmt::Debug for SyncEngine<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncEngine")
            .field("in_flight", &*self.inner.in_flight.borrow())
            .field("notifications", &self.inner.notifications)
            .finish_non_exhaustive()
    }
}

impl<R: RemoteStore> SyncEngine<R> {
    /// Creates an engine with a fresh state store and notification center.
    #[must_use]
    pub fn new(remote: R) -> Self {
        Self::with_parts(
            Arc::new(remote),
            Arc::new(StateStore::new()),
            NotificationCenter::new(),
        )
    }

    /// Creates an engine around existing parts.
    #[must_use]
    pub fn with_parts(
        remote: Arc<R>,
        store: Arc<StateStore>,
        notifications: NotificationCenter,
    ) -> Self {
        let (in_flight, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                remote,
                store,
                notifications,
                slots: Mutex::new(Default::default()),
                in_flight: Arc::new(in_flight),
            }),
        }
    }

    /// Applies `intent` to the store and, for command intents, starts the
    /// remote call in the intent's slot, superseding whatever runs there.
    pub fn dispatch(&self, intent: Intent) {
        self.inner.store.apply(&intent);
        let (Some(kind), Some(command)) = (intent.command_kind(), Command::from_intent(&intent))
        else {
            return;
        };

        let mut slots = self.inner.slots.lock();
        let slot = &mut slots[kind.index()];
        slot.generation = slot.generation.wrapping_add(1);
        let generation = slot.generation;
        if let Some(previous) = slot.task.take() {
            tracing::debug!(%kind, generation, "superseding in-flight command");
            previous.abort();
        }

        tracing::debug!(%kind, generation, ?command, "command started");
        let guard = InFlight::enter(&self.inner.in_flight);
        let inner = Arc::clone(&self.inner);
        slot.task = Some(tokio::spawn(async move {
            let _guard = guard;
            let outcome = execute(inner.remote.as_ref(), command).await;
            inner.finish(kind, generation, outcome);
        }));
    }

    /// Reloads the whole collection.
    pub fn load(&self) {
        self.dispatch(Intent::Load);
    }

    /// Creates an open task.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] if the title is out of bounds;
    /// nothing is dispatched in that case.
    pub fn create(&self, title: &str, priority: Priority) -> Result<(), EngineError> {
        let title = validate_title(title)?;
        self.dispatch(Intent::Create { title, priority });
        Ok(())
    }

    /// Changes the fields present in `patch`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] if the patch carries an
    /// out-of-bounds title; nothing is dispatched in that case.
    pub fn update(&self, id: TaskId, mut patch: TaskPatch) -> Result<(), EngineError> {
        if let Some(title) = patch.title.take() {
            patch.title = Some(validate_title(&title)?);
        }
        self.dispatch(Intent::Update { id, patch });
        Ok(())
    }

    /// Removes a task.
    pub fn delete(&self, id: TaskId) {
        self.dispatch(Intent::Delete { id });
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> TaskState {
        self.inner.store.snapshot()
    }

    /// Subscribes to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<TaskState> {
        self.inner.store.subscribe()
    }

    /// Subscribes to every intent applied from now on, commands and
    /// outcomes alike, in application order.
    #[must_use]
    pub fn subscribe_intents(&self) -> broadcast::Receiver<Intent> {
        self.inner.store.subscribe_intents()
    }

    /// The state store.
    #[must_use]
    pub fn store(&self) -> &Arc<StateStore> {
        &self.inner.store
    }

    /// The notification center outcomes are posted to.
    #[must_use]
    pub fn notifications(&self) -> &NotificationCenter {
        &self.inner.notifications
    }

    /// The remote store.
    #[must_use]
    pub fn remote(&self) -> &Arc<R> {
        &self.inner.remote
    }

    /// Whether a command of `kind` is still running.
    #[must_use]
    pub fn is_in_flight(&self, kind: CommandKind) -> bool {
        self.inner.slots.lock()[kind.index()].task.is_some()
    }

    /// Waits until no command of any kind is running.
    pub async fn settle(&self) {
        let mut rx = self.inner.in_flight.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|n| *n == 0).await;
    }
}
