//! Remote task store abstraction.
//!
//! Defines the [`RemoteStore`] trait the sync engine talks to. Concrete
//! implementations:
//! - [`http::HttpRemote`]: JSON over HTTP against a `/tasks` collection
//! - [`memory::InMemoryRemote`]: in-process store with latency and failure
//!   injection, for tests and offline runs
//!
//! The store is stateless from the client's point of view: no transactions,
//! no version tokens. A replace is a blind overwrite.

pub mod http;
pub mod memory;

use std::future::Future;

use tasker_proto::task::{NewTask, Task, TaskId};

/// Errors returned by remote store operations.
///
/// The sync engine does not distinguish between these; every variant is a
/// transport/server failure and is reported by its display string.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The request could not be sent or its response could not be read.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("{method} {path} returned {status}")]
    Status {
        /// HTTP method of the request.
        method: &'static str,
        /// Request path.
        path: String,
        /// Response status code.
        status: u16,
    },

    /// The configured base URL cannot address the task collection.
    #[error("invalid base URL: {0}")]
    InvalidUrl(String),

    /// The store is not reachable.
    #[error("remote store unavailable: {0}")]
    Unavailable(String),
}

impl RemoteError {
    /// Returns the HTTP status for [`RemoteError::Status`].
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Async CRUD access to the authoritative task collection.
///
/// Implementations map one-to-one onto the remote protocol:
///
/// | Method | Request |
/// |---|---|
/// | [`list`](Self::list) | `GET /tasks` |
/// | [`get`](Self::get) | `GET /tasks/{id}` |
/// | [`create`](Self::create) | `POST /tasks` |
/// | [`replace`](Self::replace) | `PUT /tasks/{id}` |
/// | [`delete`](Self::delete) | `DELETE /tasks/{id}` |
pub trait RemoteStore: Send + Sync + 'static {
    /// Fetch every task, in store order.
    fn list(&self) -> impl Future<Output = Result<Vec<Task>, RemoteError>> + Send;

    /// Fetch one task by id.
    fn get(&self, id: &TaskId) -> impl Future<Output = Result<Task, RemoteError>> + Send;

    /// Create a task; the store assigns its id.
    fn create(&self, task: &NewTask) -> impl Future<Output = Result<Task, RemoteError>> + Send;

    /// Overwrite the task stored under `task.id` with `task`.
    fn replace(&self, task: &Task) -> impl Future<Output = Result<Task, RemoteError>> + Send;

    /// Remove a task.
    fn delete(&self, id: &TaskId) -> impl Future<Output = Result<(), RemoteError>> + Send;
}
