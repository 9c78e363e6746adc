//! HTTP surface of the development server.
//!
//! | Method | Path | Success | Failure |
//! |---|---|---|---|
//! | GET | `/tasks` | 200, `[Task]` | |
//! | GET | `/tasks/{id}` | 200, `Task` | 404 |
//! | POST | `/tasks` | 201, `Task` | 422 |
//! | PUT | `/tasks/{id}` | 200, `Task` | 422 |
//! | DELETE | `/tasks/{id}` | 204 | 404 |

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;

use tasker_proto::task::{NewTask, Task, TaskId};

use crate::store::TaskStore;

type ServerResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Builds the router for `store`.
#[must_use]
pub fn router(store: Arc<TaskStore>) -> axum::Router {
    axum::Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).put(replace_task).delete(delete_task),
        )
        .with_state(store)
}

/// Starts the server on `addr` with an empty store.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
    addr: &str,
) -> ServerResult<(std::net::SocketAddr, tokio::task::JoinHandle<()>)> {
    start_server_with_state(addr, Arc::new(TaskStore::new())).await
}

/// Starts the server on `addr` serving `store`.
///
/// Returns the bound address (useful with port 0) and the server task.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server_with_state(
    addr: &str,
    store: Arc<TaskStore>,
) -> ServerResult<(std::net::SocketAddr, tokio::task::JoinHandle<()>)> {
    let app = router(store);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "task server error");
        }
    });

    Ok((bound_addr, handle))
}

async fn list_tasks(State(store): State<Arc<TaskStore>>) -> Json<Vec<Task>> {
    Json(store.list().await)
}

async fn get_task(
    State(store): State<Arc<TaskStore>>,
    Path(id): Path<String>,
) -> Result<Json<Task>, StatusCode> {
    store
        .get(&TaskId::new(id))
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn create_task(
    State(store): State<Arc<TaskStore>>,
    body: Result<Json<NewTask>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), StatusCode> {
    let Json(new_task) = body.map_err(|e| {
        tracing::warn!(error = %e, "rejected create body");
        StatusCode::UNPROCESSABLE_ENTITY
    })?;
    let task = store.create(new_task).await;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn replace_task(
    State(store): State<Arc<TaskStore>>,
    Path(id): Path<String>,
    body: Result<Json<Task>, JsonRejection>,
) -> Result<Json<Task>, StatusCode> {
    let Json(task) = body.map_err(|e| {
        tracing::warn!(%id, error = %e, "rejected replace body");
        StatusCode::UNPROCESSABLE_ENTITY
    })?;
    Ok(Json(store.replace(TaskId::new(id), task).await))
}

async fn delete_task(
    State(store): State<Arc<TaskStore>>,
    Path(id): Path<String>,
) -> StatusCode {
    if store.delete(&TaskId::new(id)).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}
