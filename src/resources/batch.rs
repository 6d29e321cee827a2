//! Batch job operations.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use tokio::time::{Instant, sleep};

use crate::error::ApiError;
use crate::http::Http;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(300);

/// One operation inside a batch job.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOperation {
    pub method: String,
    pub endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl BatchOperation {
    pub fn new(method: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            endpoint: endpoint.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A batch job as reported by the API.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub id: String,
    pub status: String,
    pub status_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_operations: u64,
    pub completed_operations: u64,
    pub results: Vec<Value>,
    pub errors: Vec<Value>,
}

impl BatchJob {
    /// Builds a job from an API record. The job id arrives as `jobId` on
    /// creation responses and `id` elsewhere.
    pub fn from_value(data: &Value) -> Self {
        Self {
            id: string_field(data, "jobId")
                .or_else(|| string_field(data, "id"))
                .unwrap_or_default(),
            status: string_field(data, "status").unwrap_or_default(),
            status_url: string_field(data, "statusUrl"),
            created_at: datetime_field(data, "createdAt"),
            completed_at: datetime_field(data, "completedAt"),
            total_operations: u64_field(data, "totalOperations"),
            completed_operations: u64_field(data, "completedOperations"),
            results: array_field(data, "results"),
            errors: array_field(data, "errors"),
        }
    }

    /// Whether the job reached a terminal status.
    pub fn is_complete(&self) -> bool {
        matches!(self.status.as_str(), "completed" | "failed" | "cancelled")
    }

    /// Completed operations as a percentage of the total.
    pub fn progress_percentage(&self) -> u8 {
        if self.total_operations == 0 {
            return 0;
        }
        ((self.completed_operations * 100) / self.total_operations) as u8
    }
}

fn string_field(data: &Value, key: &str) -> Option<String> {
    data.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn datetime_field(data: &Value, key: &str) -> Option<DateTime<Utc>> {
    data.get(key)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn u64_field(data: &Value, key: &str) -> u64 {
    data.get(key).and_then(Value::as_u64).unwrap_or(0)
}

fn array_field(data: &Value, key: &str) -> Vec<Value> {
    data.get(key)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Operations for batch processing.
pub struct Batch {
    http: Arc<Http>,
}

impl Batch {
    pub(crate) fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    /// Creates a new batch job from the given operations.
    pub async fn create(&self, operations: &[BatchOperation]) -> Result<BatchJob, ApiError> {
        let body = json!({ "operations": operations });
        let response = self.http.post("/api/v2/batch", Some(&body)).await?;
        Ok(BatchJob::from_value(&response))
    }

    /// Fetches the current status of a batch job.
    pub async fn status(&self, job_id: &str) -> Result<BatchJob, ApiError> {
        let response = self
            .http
            .get::<()>(&format!("/api/v2/batch/{job_id}"), None)
            .await?;
        let job = response.get("job").cloned().unwrap_or(Value::Null);
        Ok(BatchJob::from_value(&job))
    }

    /// Lists all batch jobs for the authenticated user.
    pub async fn list(&self) -> Result<Vec<BatchJob>, ApiError> {
        let response = self.http.get::<()>("/api/v2/batch", None).await?;
        let jobs = response
            .get("jobs")
            .and_then(Value::as_array)
            .map(|jobs| jobs.iter().map(BatchJob::from_value).collect())
            .unwrap_or_default();
        Ok(jobs)
    }

    /// Cancels a batch job.
    pub async fn cancel(&self, job_id: &str) -> Result<Value, ApiError> {
        self.http.delete(&format!("/api/v2/batch/{job_id}")).await
    }

    /// Polls a job until it reaches a terminal status.
    ///
    /// Uses the default poll interval (2s) and timeout (300s) when `None`.
    pub async fn wait_for_completion(
        &self,
        job_id: &str,
        poll_interval: Option<Duration>,
        timeout: Option<Duration>,
    ) -> Result<BatchJob, ApiError> {
        let poll_interval = poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL);
        let timeout = timeout.unwrap_or(DEFAULT_WAIT_TIMEOUT);
        let start = Instant::now();

        loop {
            let job = self.status(job_id).await?;
            if job.is_complete() {
                return Ok(job);
            }
            if start.elapsed() > timeout {
                return Err(ApiError::BatchTimeout {
                    job_id: job_id.to_string(),
                    waited: timeout,
                });
            }
            sleep(poll_interval).await;
        }
    }

    /// Triggers batch collection for multiple airports.
    pub async fn collect(
        &self,
        airports: &[&str],
        options: Option<Value>,
    ) -> Result<BatchJob, ApiError> {
        let mut body = json!({ "airports": airports });
        if let Some(options) = options {
            body["options"] = options;
        }
        let response = self.http.post("/api/v2/batch/collect", Some(&body)).await?;
        Ok(BatchJob::from_value(&response))
    }

    /// Applies a batch of flight updates, each carrying `id` and `data`.
    pub async fn flight_updates(&self, updates: &[Value]) -> Result<Value, ApiError> {
        let body = json!({ "updates": updates });
        self.http
            .post("/api/v2/batch/flights/update", Some(&body))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_fallback() {
        let created = json!({ "jobId": "job-1", "status": "pending" });
        assert_eq!(BatchJob::from_value(&created).id, "job-1");

        let fetched = json!({ "id": "job-2", "status": "running" });
        assert_eq!(BatchJob::from_value(&fetched).id, "job-2");
    }

    #[test]
    fn test_is_complete() {
        for status in ["completed", "failed", "cancelled"] {
            let job = BatchJob::from_value(&json!({ "id": "j", "status": status }));
            assert!(job.is_complete(), "{status} should be terminal");
        }
        let job = BatchJob::from_value(&json!({ "id": "j", "status": "running" }));
        assert!(!job.is_complete());
    }

    #[test]
    fn test_progress_percentage() {
        let job = BatchJob::from_value(&json!({
            "id": "j",
            "status": "running",
            "totalOperations": 8,
            "completedOperations": 2,
        }));
        assert_eq!(job.progress_percentage(), 25);

        let empty = BatchJob::from_value(&json!({ "id": "j", "status": "pending" }));
        assert_eq!(empty.progress_percentage(), 0);
    }

    #[test]
    fn test_timestamps_parse() {
        let job = BatchJob::from_value(&json!({
            "id": "j",
            "status": "completed",
            "createdAt": "2025-06-01T10:00:00Z",
            "completedAt": "not a timestamp",
        }));
        assert!(job.created_at.is_some());
        assert!(job.completed_at.is_none());
    }
}
