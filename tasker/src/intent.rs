//! The closed set of intents that drive task state.
//!
//! Command intents ([`Intent::Load`], [`Intent::Create`], [`Intent::Update`],
//! [`Intent::Delete`]) ask the sync engine to talk to the remote store.
//! Outcome intents report what happened and are consumed only by the reducer.

use std::fmt;

use tasker_proto::task::{Priority, Task, TaskId, TaskPatch};

/// A requested state change or the reported outcome of one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Fetch the full collection from the remote store.
    Load,
    /// The collection was fetched.
    LoadSucceeded {
        /// Every task held by the store, in store order.
        tasks: Vec<Task>,
    },
    /// Fetching the collection failed.
    LoadFailed {
        /// Human-readable failure description.
        error: String,
    },
    /// Create a new open task.
    Create {
        /// Title of the new task.
        title: String,
        /// Priority of the new task.
        priority: Priority,
    },
    /// The store created a task.
    CreateSucceeded {
        /// The record returned by the store, id included.
        task: Task,
    },
    /// Creating a task failed.
    CreateFailed {
        /// Human-readable failure description.
        error: String,
    },
    /// Change some fields of an existing task.
    Update {
        /// Task to change.
        id: TaskId,
        /// Fields to overwrite.
        patch: TaskPatch,
    },
    /// The store accepted an update.
    UpdateSucceeded {
        /// The record returned by the store.
        task: Task,
    },
    /// Updating a task failed.
    UpdateFailed {
        /// Human-readable failure description.
        error: String,
    },
    /// Remove a task.
    Delete {
        /// Task to remove.
        id: TaskId,
    },
    /// The store removed a task.
    DeleteSucceeded {
        /// The removed task's id.
        id: TaskId,
    },
    /// Removing a task failed.
    DeleteFailed {
        /// Human-readable failure description.
        error: String,
    },
}

/// The four kinds of command intents.
///
/// Each kind owns one in-flight slot in the sync engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// [`Intent::Load`].
    Load,
    /// [`Intent::Create`].
    Create,
    /// [`Intent::Update`].
    Update,
    /// [`Intent::Delete`].
    Delete,
}

impl CommandKind {
    /// All command kinds, in slot order.
    pub const ALL: [Self; 4] = [Self::Load, Self::Create, Self::Update, Self::Delete];

    /// Position of this kind's slot.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Load => 0,
            Self::Create => 1,
            Self::Update => 2,
            Self::Delete => 3,
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load => write!(f, "load"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

impl Intent {
    /// Returns the command kind for command intents, `None` for outcomes.
    #[must_use]
    pub const fn command_kind(&self) -> Option<CommandKind> {
        match self {
            Self::Load => Some(CommandKind::Load),
            Self::Create { .. } => Some(CommandKind::Create),
            Self::Update { .. } => Some(CommandKind::Update),
            Self::Delete { .. } => Some(CommandKind::Delete),
            Self::LoadSucceeded { .. }
            | Self::LoadFailed { .. }
            | Self::CreateSucceeded { .. }
            | Self::CreateFailed { .. }
            | Self::UpdateSucceeded { .. }
            | Self::UpdateFailed { .. }
            | Self::DeleteSucceeded { .. }
            | Self::DeleteFailed { .. } => None,
        }
    }

    /// Returns `true` for outcome intents.
    #[must_use]
    pub const fn is_outcome(&self) -> bool {
        self.command_kind().is_none()
    }

    /// Returns the failure message carried by a `*Failed` outcome.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::LoadFailed { error }
            | Self::CreateFailed { error }
            | Self::UpdateFailed { error }
            | Self::DeleteFailed { error } => Some(error),
            _ => None,
        }
    }

    /// Returns the command kind an outcome intent answers.
    #[must_use]
    pub const fn answers(&self) -> Option<CommandKind> {
        match self {
            Self::LoadSucceeded { .. } | Self::LoadFailed { .. } => Some(CommandKind::Load),
            Self::CreateSucceeded { .. } | Self::CreateFailed { .. } => Some(CommandKind::Create),
            Self::UpdateSucceeded { .. } | Self::UpdateFailed { .. } => Some(CommandKind::Update),
            Self::DeleteSucceeded { .. } | Self::DeleteFailed { .. } => Some(CommandKind::Delete),
            Self::Load | Self::Create { .. } | Self::Update { .. } | Self::Delete { .. } => None,
        }
    }
}
