//! HTTP client for the task API.
//!
//! Used by the terminal UI and by the one-shot CLI commands. Every non-2xx
//! response is turned into a [`ClientError`]; nothing is retried.

use std::collections::BTreeMap;

use reqwest::{Response, StatusCode};
use serde::Serialize;

use crate::task::Task;
use crate::validation::ValidationBody;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("task {0} not found")]
    NotFound(u64),
    #[error("validation failed: {message}")]
    Validation { message: String, errors: BTreeMap<String, Vec<String>> },
    #[error("server responded with {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Body sent on create, and on a form-driven update.
///
/// Keys left as `None` are not sent at all, so the server keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskInput {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct TaskClient {
    http: reqwest::Client,
    base_url: String,
}

impl TaskClient {
    pub fn new(base_url: &str) -> Self {
        TaskClient {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection(&self) -> String {
        format!("{}/tasks", self.base_url)
    }

    fn member(&self, id: u64) -> String {
        format!("{}/tasks/{}", self.base_url, id)
    }

    /// `GET /tasks`
    pub async fn list(&self) -> Result<Vec<Task>, ClientError> {
        let resp = self.http.get(self.collection()).send().await?;
        Ok(check(resp, None).await?.json().await?)
    }

    /// `POST /tasks`
    pub async fn create(&self, input: &TaskInput) -> Result<Task, ClientError> {
        let resp = self.http.post(self.collection()).json(input).send().await?;
        Ok(check(resp, None).await?.json().await?)
    }

    /// `GET /tasks/{id}`
    pub async fn get(&self, id: u64) -> Result<Task, ClientError> {
        let resp = self.http.get(self.member(id)).send().await?;
        Ok(check(resp, Some(id)).await?.json().await?)
    }

    /// `PUT /tasks/{id}` with any serialisable body, e.g. a [`TaskInput`]
    /// or a whole [`Task`] for the toggle flow.
    pub async fn update<B: Serialize + ?Sized>(&self, id: u64, body: &B) -> Result<Task, ClientError> {
        let resp = self.http.put(self.member(id)).json(body).send().await?;
        Ok(check(resp, Some(id)).await?.json().await?)
    }

    /// `DELETE /tasks/{id}`
    pub async fn delete(&self, id: u64) -> Result<(), ClientError> {
        let resp = self.http.delete(self.member(id)).send().await?;
        check(resp, Some(id)).await?;
        Ok(())
    }
}

/// Map an error status to a typed error, passing successful responses through.
async fn check(resp: Response, id: Option<u64>) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if let (StatusCode::NOT_FOUND, Some(id)) = (status, id) {
        return Err(ClientError::NotFound(id));
    }
    let body = resp.text().await?;
    if status == StatusCode::UNPROCESSABLE_ENTITY {
        if let Ok(v) = serde_json::from_str::<ValidationBody>(&body) {
            return Err(ClientError::Validation { message: v.message, errors: v.errors });
        }
    }
    Err(ClientError::Status { status, body })
}
