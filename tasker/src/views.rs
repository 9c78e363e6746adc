//! Read-only projections over [`TaskState`].
//!
//! Every function here is pure and recomputes from the state it is given;
//! nothing is cached. [`outstanding`] and [`completed`] partition
//! [`all_tasks`]: each task lands in exactly one of them, in its original
//! order.

use std::fmt;
use std::str::FromStr;

use tasker_proto::task::Task;

use crate::store::TaskState;

/// Every task, in store order.
#[must_use]
pub fn all_tasks(state: &TaskState) -> &[Task] {
    &state.tasks
}

/// Tasks that are not done yet.
#[must_use]
pub fn outstanding(state: &TaskState) -> Vec<&Task> {
    state.tasks.iter().filter(|t| !t.is_done).collect()
}

/// Tasks that are done.
#[must_use]
pub fn completed(state: &TaskState) -> Vec<&Task> {
    state.tasks.iter().filter(|t| t.is_done).collect()
}

/// Whether a load is in flight.
#[must_use]
pub const fn is_loading(state: &TaskState) -> bool {
    state.loading
}

/// The last failure message, if any.
#[must_use]
pub fn last_error(state: &TaskState) -> Option<&str> {
    state.error.as_deref()
}

/// Which subset of tasks a list shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskFilter {
    /// Every task.
    #[default]
    All,
    /// Only tasks that are not done.
    Outstanding,
    /// Only tasks that are done.
    Completed,
}

impl TaskFilter {
    /// Returns `true` if `task` belongs to this subset.
    #[must_use]
    pub const fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Outstanding => !task.is_done,
            Self::Completed => task.is_done,
        }
    }

    /// Applies the filter to `state`, preserving order.
    #[must_use]
    pub fn apply(self, state: &TaskState) -> Vec<&Task> {
        match self {
            Self::All => state.tasks.iter().collect(),
            Self::Outstanding => outstanding(state),
            Self::Completed => completed(state),
        }
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Outstanding => write!(f, "outstanding"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for TaskFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "outstanding" | "open" => Ok(Self::Outstanding),
            "completed" | "done" => Ok(Self::Completed),
            other => Err(format!("unknown filter: {other}")),
        }
    }
}
