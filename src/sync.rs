//! HTTP plumbing for the spreadsheet webhook.
//!
//! The endpoint is expected to answer `GET` with a JSON array of students
//! and to append one row per `POST`. Neither operation is retried.

use crate::errors::SyncError;
use crate::models::Student;
use reqwest::Client;
use tracing::{debug, warn};

#[derive(Debug)]
pub enum FetchOutcome {
    /// No endpoint configured.
    Skipped,
    Records(Vec<Student>),
    /// Valid JSON that is not an array; treated as "no data".
    NotAList,
}

/// Result of a write. The webhook never confirms the row, so the best a
/// successful-looking answer can tell us is `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendOutcome {
    Skipped,
    Unknown,
    Failed(String),
}

#[derive(Clone, Default)]
pub struct SyncClient {
    client: Client,
}

impl SyncClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn fetch_all(&self, url: Option<&str>) -> Result<FetchOutcome, SyncError> {
        let Some(url) = url else {
            return Ok(FetchOutcome::Skipped);
        };

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status(status));
        }

        let bytes = response.bytes().await?;
        let body: serde_json::Value = serde_json::from_slice(&bytes)?;
        Ok(decode_records(body))
    }

    pub async fn append_one(&self, url: Option<&str>, student: &Student) -> AppendOutcome {
        let Some(url) = url else {
            return AppendOutcome::Skipped;
        };

        let status = match self.client.post(url).json(student).send().await {
            Ok(response) => response.status(),
            Err(err) => return AppendOutcome::Failed(err.to_string()),
        };

        if status.is_client_error() || status.is_server_error() {
            return AppendOutcome::Failed(format!("sheet endpoint answered {status}"));
        }
        debug!(%status, id = %student.id, "append sent");
        AppendOutcome::Unknown
    }
}

fn decode_records(body: serde_json::Value) -> FetchOutcome {
    let serde_json::Value::Array(items) = body else {
        return FetchOutcome::NotAList;
    };

    let mut students = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<Student>(item) {
            Ok(student) => students.push(student),
            Err(err) => warn!("skipping malformed sheet row: {err}"),
        }
    }
    FetchOutcome::Records(students)
}
