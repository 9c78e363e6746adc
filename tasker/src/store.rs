//! Task state, the reducer, and the container that owns them.
//!
//! [`reduce`] is the only function that computes new task state. It is pure:
//! no I/O, no clock, no randomness. [`StateStore`] is the single writer that
//! feeds intents through it, one at a time, and publishes every new state
//! and every applied intent to subscribers.

use tokio::sync::{broadcast, watch};

use tasker_proto::task::Task;

use crate::intent::Intent;

/// Default capacity of the applied-intent broadcast channel.
pub const DEFAULT_INTENT_BUFFER: usize = 64;

/// Local copy of the task collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskState {
    /// Tasks in store order. Never re-sorted locally.
    pub tasks: Vec<Task>,
    /// `true` while a load is in flight.
    pub loading: bool,
    /// Message of the last failure, cleared by the next success.
    pub error: Option<String>,
}

/// Computes the state that follows `state` after `intent`.
///
/// Command intents other than [`Intent::Load`] leave the state untouched;
/// the sync engine acts on them. Update and delete outcomes for ids that are
/// not present only clear the error. A created task whose id is already
/// present replaces that entry instead of being appended.
#[must_use]
pub fn reduce(mut state: TaskState, intent: &Intent) -> TaskState {
    match intent {
        Intent::Load => {
            state.loading = true;
            state.error = None;
        }
        Intent::LoadSucceeded { tasks } => {
            state.tasks.clone_from(tasks);
            state.loading = false;
        }
        Intent::LoadFailed { error } => {
            state.loading = false;
            state.error = Some(error.clone());
        }
        Intent::CreateSucceeded { task } => {
            // A load that overtook the create may already hold the record.
            if let Some(slot) = state.tasks.iter_mut().find(|t| t.id == task.id) {
                slot.clone_from(task);
            } else {
                state.tasks.push(task.clone());
            }
            state.error = None;
        }
        Intent::UpdateSucceeded { task } => {
            if let Some(slot) = state.tasks.iter_mut().find(|t| t.id == task.id) {
                slot.clone_from(task);
            }
            state.error = None;
        }
        Intent::DeleteSucceeded { id } => {
            state.tasks.retain(|t| t.id != *id);
            state.error = None;
        }
        Intent::CreateFailed { error }
        | Intent::UpdateFailed { error }
        | Intent::DeleteFailed { error } => {
            state.error = Some(error.clone());
        }
        Intent::Create { .. } | Intent::Update { .. } | Intent::Delete { .. } => {}
    }
    state
}

/// Owner of the live [`TaskState`].
///
/// Share it by `Arc`. Readers take snapshots or subscribe; the only way to
/// change state is [`apply`](Self::apply).
pub struct StateStore {
    state: watch::Sender<TaskState>,
    applied: broadcast::Sender<Intent>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    /// Creates a store holding the empty initial state.
    #[must_use]
    pub fn new() -> Self {
        Self::with_intent_buffer(DEFAULT_INTENT_BUFFER)
    }

    /// Creates a store whose applied-intent channel holds `capacity` entries.
    ///
    /// Slow intent subscribers past that backlog observe a lag error.
    #[must_use]
    pub fn with_intent_buffer(capacity: usize) -> Self {
        let (state, _) = watch::channel(TaskState::default());
        let (applied, _) = broadcast::channel(capacity.max(1));
        Self { state, applied }
    }

    /// Runs `intent` through the reducer and publishes the result.
    ///
    /// Calls are serialized: the reduction and the intent broadcast happen
    /// under the state lock, so subscribers see intents in application order.
    pub fn apply(&self, intent: &Intent) {
        self.state.send_modify(|state| {
            *state = reduce(std::mem::take(state), intent);
            // No subscribers is fine.
            let _ = self.applied.send(intent.clone());
        });
        tracing::trace!(?intent, "intent applied");
    }

    /// Returns a copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> TaskState {
        self.state.borrow().clone()
    }

    /// Runs `f` against the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&TaskState) -> R) -> R {
        f(&self.state.borrow())
    }

    /// Subscribes to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<TaskState> {
        self.state.subscribe()
    }

    /// Subscribes to every intent applied from now on.
    #[must_use]
    pub fn subscribe_intents(&self) -> broadcast::Receiver<Intent> {
        self.applied.subscribe()
    }
}
