//! HTTP implementation of [`RemoteStore`].
//!
//! Talks JSON to a `/tasks` collection below a base URL, e.g.
//! `http://localhost:3000` → `http://localhost:3000/tasks`.

use std::time::Duration;

use reqwest::{Client, Response};
use url::Url;

use tasker_proto::task::{NewTask, Task, TaskId};

use super::{RemoteError, RemoteStore};

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Remote store reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: Client,
    collection: Url,
}

impl HttpRemote {
    /// Creates a client for the `/tasks` collection below `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::InvalidUrl`] if `base_url` does not parse or
    /// cannot have path segments, or [`RemoteError::Request`] if the HTTP
    /// client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let mut base =
            Url::parse(base_url).map_err(|e| RemoteError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(RemoteError::InvalidUrl(base_url.to_string()));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let collection = base
            .join("tasks")
            .map_err(|e| RemoteError::InvalidUrl(format!("{base_url}: {e}")))?;

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, collection })
    }

    /// URL of the task collection.
    #[must_use]
    pub const fn collection_url(&self) -> &Url {
        &self.collection
    }

    /// URL of a single task.
    #[must_use]
    pub fn item_url(&self, id: &TaskId) -> Url {
        let mut url = self.collection.clone();
        // Checked in `new`: the collection URL can be a base.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(id.as_str());
        }
        url
    }

    /// Turns non-success responses into [`RemoteError::Status`].
    fn check(method: &'static str, response: Response) -> Result<Response, RemoteError> {
        let status = response.status();
        tracing::debug!(
            method,
            url = %response.url(),
            status = status.as_u16(),
            "remote response"
        );
        if status.is_success() {
            Ok(response)
        } else {
            Err(RemoteError::Status {
                method,
                path: response.url().path().to_string(),
                status: status.as_u16(),
            })
        }
    }
}

impl RemoteStore for HttpRemote {
    async fn list(&self) -> Result<Vec<Task>, RemoteError> {
        let response = self.client.get(self.collection.clone()).send().await?;
        Ok(Self::check("GET", response)?.json().await?)
    }

    async fn get(&self, id: &TaskId) -> Result<Task, RemoteError> {
        let response = self.client.get(self.item_url(id)).send().await?;
        Ok(Self::check("GET", response)?.json().await?)
    }

    async fn create(&self, task: &NewTask) -> Result<Task, RemoteError> {
        let response = self
            .client
            .post(self.collection.clone())
            .json(task)
            .send()
            .await?;
        Ok(Self::check("POST", response)?.json().await?)
    }

    async fn replace(&self, task: &Task) -> Result<Task, RemoteError> {
        let response = self
            .client
            .put(self.item_url(&task.id))
            .json(task)
            .send()
            .await?;
        Ok(Self::check("PUT", response)?.json().await?)
    }

    async fn delete(&self, id: &TaskId) -> Result<(), RemoteError> {
        let response = self.client.delete(self.item_url(id)).send().await?;
        Self::check("DELETE", response)?;
        Ok(())
    }
}
