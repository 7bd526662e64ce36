// Client trait for the speed-test backend
use crate::domain::logs::LogsResponse;
use crate::domain::sample::Sample;
use crate::domain::status::SchedulerStatus;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{path} returned {status}: {body}")]
    Status {
        path: String,
        status: u16,
        body: String,
    },

    #[error("could not decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Acknowledgement of a manual test trigger. Completion is not reported.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestAck {
    #[serde(default)]
    pub message: Option<String>,
}

#[async_trait]
pub trait SpeedTestApi: Send + Sync {
    /// Most recent samples first
    async fn fetch_history(&self, limit: usize) -> Result<Vec<Sample>, ApiError>;

    /// Samples of one calendar day, oldest first; empty when there are none
    async fn fetch_history_by_day(&self, date: NaiveDate) -> Result<Vec<Sample>, ApiError>;

    async fn fetch_logs(&self) -> Result<LogsResponse, ApiError>;

    async fn fetch_status(&self) -> Result<SchedulerStatus, ApiError>;

    /// Trigger a measurement in the background
    async fn start_test(&self) -> Result<TestAck, ApiError>;

    async fn clear_history(&self) -> Result<(), ApiError>;

    async fn clear_logs(&self) -> Result<(), ApiError>;
}
