//! Remote todo records and the sources that fetch them.
//!
//! # Responsibility
//! - Mirror the demo API payload as plain serde records.
//! - Provide the `TodoSource` seam plus the HTTP implementation.
//!
//! # Invariants
//! - Every payload field is optional; decoding never fails on a missing key.
//! - `HttpTodoSource` issues exactly one GET per fetch, without retries.

use crate::repo::task_repo::RepoError;
use log::{error, info};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

/// Base URL of the public demo API.
pub const DEFAULT_REMOTE_BASE_URL: &str = "https://dummyjson.com/";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const TODOS_PATH: &str = "todos";

pub type SyncResult<T> = Result<T, SyncError>;

/// Sync-layer error for transport, decoding and local persistence failures.
#[derive(Debug)]
pub enum SyncError {
    /// Request could not be sent or the body could not be read.
    Http(String),
    /// Server answered with a non-success status.
    Status { status: u16, body: String },
    /// Body is not a valid todos payload.
    Decode(String),
    Repo(RepoError),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(message) => write!(f, "remote request failed: {message}"),
            Self::Status { status, body } => {
                write!(f, "remote returned status {status}: {body}")
            }
            Self::Decode(message) => write!(f, "invalid remote payload: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Http(_) | Self::Status { .. } | Self::Decode(_) => None,
        }
    }
}

impl From<RepoError> for SyncError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// One todo as served by the remote API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTodo {
    pub id: Option<i64>,
    pub todo: Option<String>,
    pub completed: Option<bool>,
    pub user_id: Option<i64>,
}

/// List envelope returned by `GET /todos`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodosResponse {
    pub todos: Option<Vec<RemoteTodo>>,
    pub total: Option<i64>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl TodosResponse {
    /// Decodes a raw JSON body.
    pub fn from_json(body: &str) -> SyncResult<Self> {
        serde_json::from_str(body).map_err(|err| SyncError::Decode(err.to_string()))
    }
}

/// Source of remote todos.
pub trait TodoSource {
    fn fetch_todos(&self) -> SyncResult<TodosResponse>;
}

/// `TodoSource` backed by a blocking HTTP GET.
#[derive(Debug, Clone)]
pub struct HttpTodoSource {
    client: Client,
    base_url: String,
}

impl HttpTodoSource {
    /// Creates a source for `base_url` with the given request timeout.
    ///
    /// # Errors
    /// - Returns `SyncError::Http` when the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| SyncError::Http(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Full URL of the todos endpoint.
    pub fn endpoint_url(&self) -> String {
        format!("{}/{TODOS_PATH}", self.base_url.trim_end_matches('/'))
    }
}

impl TodoSource for HttpTodoSource {
    fn fetch_todos(&self) -> SyncResult<TodosResponse> {
        let started_at = Instant::now();
        let url = self.endpoint_url();
        info!("event=remote_fetch module=sync status=start url={url}");

        let result = self
            .client
            .get(&url)
            .send()
            .map_err(|err| SyncError::Http(err.to_string()))
            .and_then(|response| {
                let status = response.status();
                let body = response
                    .text()
                    .map_err(|err| SyncError::Http(err.to_string()))?;
                if !status.is_success() {
                    return Err(SyncError::Status {
                        status: status.as_u16(),
                        body,
                    });
                }
                TodosResponse::from_json(&body)
            });

        match &result {
            Ok(response) => info!(
                "event=remote_fetch module=sync status=ok duration_ms={} todos={}",
                started_at.elapsed().as_millis(),
                response.todos.as_ref().map_or(0, Vec::len)
            ),
            Err(err) => error!(
                "event=remote_fetch module=sync status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }

        result
    }
}
