// HTTP client for the speed-test backend
use crate::application::speedtest_api::{ApiError, SpeedTestApi, TestAck};
use crate::domain::logs::LogsResponse;
use crate::domain::sample::Sample;
use crate::domain::status::SchedulerStatus;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpSpeedTestApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSpeedTestApi {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn build_url(&self, path: &str, query: &[(&str, String)]) -> String {
        let mut url = format!("{}{}", self.base_url, path);
        for (i, (key, value)) in query.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Response, ApiError> {
        let url = self.build_url(path, query);
        tracing::debug!("{} {}", method, url);

        let response = self
            .client
            .request(method, &url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                path: path.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                path: path.to_string(),
                status,
                body,
            });
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let response = self.send(Method::GET, path, query).await?;
        response.json::<T>().await.map_err(|source| ApiError::Decode {
            path: path.to_string(),
            source,
        })
    }
}

#[async_trait]
impl SpeedTestApi for HttpSpeedTestApi {
    async fn fetch_history(&self, limit: usize) -> Result<Vec<Sample>, ApiError> {
        let samples: Vec<Sample> = self
            .get_json("/api/history", &[("limit", limit.to_string())])
            .await?;
        tracing::debug!("Got {} samples from history", samples.len());
        Ok(samples)
    }

    async fn fetch_history_by_day(&self, date: NaiveDate) -> Result<Vec<Sample>, ApiError> {
        let date = date.format("%Y-%m-%d").to_string();
        self.get_json("/api/history/day", &[("date", date)]).await
    }

    async fn fetch_logs(&self) -> Result<LogsResponse, ApiError> {
        self.get_json("/api/logs", &[]).await
    }

    async fn fetch_status(&self) -> Result<SchedulerStatus, ApiError> {
        self.get_json("/api/status", &[]).await
    }

    async fn start_test(&self) -> Result<TestAck, ApiError> {
        let path = "/api/test";
        let response = self.send(Method::POST, path, &[]).await?;
        response.json::<TestAck>().await.map_err(|source| ApiError::Decode {
            path: path.to_string(),
            source,
        })
    }

    async fn clear_history(&self) -> Result<(), ApiError> {
        self.send(Method::DELETE, "/api/history", &[]).await?;
        Ok(())
    }

    async fn clear_logs(&self) -> Result<(), ApiError> {
        self.send(Method::DELETE, "/api/logs", &[]).await?;
        Ok(())
    }
}
