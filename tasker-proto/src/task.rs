//! Task records as exchanged with the remote task store.
//!
//! The remote store speaks JSON over HTTP. A task on the wire looks like
//! `{"id": "...", "title": "...", "isDone": false, "priority": "low"}`; the
//! types here mirror that shape exactly via serde attributes, so any priority
//! outside `low | medium | high` is rejected at deserialization time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum task title length in characters, after trimming.
pub const MIN_TASK_TITLE_LENGTH: usize = 3;

/// Maximum task title length in characters, after trimming.
pub const MAX_TASK_TITLE_LENGTH: usize = 100;

/// Errors raised while validating user-supplied task fields.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Title is empty or shorter than [`MIN_TASK_TITLE_LENGTH`].
    #[error("title must be at least {MIN_TASK_TITLE_LENGTH} characters")]
    TitleTooShort,
    /// Title exceeds [`MAX_TASK_TITLE_LENGTH`].
    #[error("title must not exceed {MAX_TASK_TITLE_LENGTH} characters")]
    TitleTooLong,
    /// Priority string is not one of `low`, `medium`, `high`.
    #[error("unknown priority: {0}")]
    UnknownPriority(String),
}

/// Opaque task identifier. Always assigned by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Wraps a store-assigned identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Default priority for new tasks.
    #[default]
    Medium,
    /// Needs attention first.
    High,
}

impl Priority {
    /// All priorities, lowest first.
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Wire representation of this priority.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownPriority(s.to_string()))
    }
}

/// A task record as held by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Store-assigned identifier, unique within the collection.
    pub id: TaskId,
    /// Display title.
    pub title: String,
    /// Completion flag.
    pub is_done: bool,
    /// Task priority.
    pub priority: Priority,
}

impl Task {
    /// Returns a copy of this task with `patch` merged over it.
    #[must_use]
    pub fn patched(&self, patch: &TaskPatch) -> Self {
        let mut task = self.clone();
        patch.apply_to(&mut task);
        task
    }
}

/// Body of a creation request. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    /// Display title.
    pub title: String,
    /// Always `false` for tasks created by the client.
    pub is_done: bool,
    /// Task priority.
    pub priority: Priority,
}

impl NewTask {
    /// Creates an open (not done) task body.
    #[must_use]
    pub fn new(title: impl Into<String>, priority: Priority) -> Self {
        Self {
            title: title.into(),
            is_done: false,
            priority,
        }
    }

    /// Attaches a store-assigned id, producing the full record.
    #[must_use]
    pub fn with_id(self, id: TaskId) -> Task {
        Task {
            id,
            title: self.title,
            is_done: self.is_done,
            priority: self.priority,
        }
    }
}

/// Partial set of task fields carried by an update.
///
/// Absent fields are left untouched when the patch is applied. The id is
/// never part of a patch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    /// New title, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New completion flag, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_done: Option<bool>,
    /// New priority, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl TaskPatch {
    /// Sets the title field.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the completion flag.
    #[must_use]
    pub const fn done(mut self, is_done: bool) -> Self {
        self.is_done = Some(is_done);
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Returns `true` if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.is_done.is_none() && self.priority.is_none()
    }

    /// Overwrites the fields of `task` that are present in this patch.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title.clone_from(title);
        }
        if let Some(is_done) = self.is_done {
            task.is_done = is_done;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
    }
}

/// Trims a user-supplied title and checks its length.
///
/// Length is counted in characters, not bytes.
///
/// # Errors
///
/// Returns [`ValidationError::TitleTooShort`] or
/// [`ValidationError::TitleTooLong`] when the trimmed title falls outside
/// `MIN_TASK_TITLE_LENGTH..=MAX_TASK_TITLE_LENGTH`.
pub fn validate_title(title: &str) -> Result<String, ValidationError> {
    let trimmed = title.trim();
    let len = trimmed.chars().count();
    if len < MIN_TASK_TITLE_LENGTH {
        return Err(ValidationError::TitleTooShort);
    }
    if len > MAX_TASK_TITLE_LENGTH {
        return Err(ValidationError::TitleTooLong);
    }
    Ok(trimmed.to_string())
}
