//! REST client for the dashboard backend.

use serde::Serialize;
use std::time::Duration;

use opsdeck_core::{
    DailyTask, FetchError, LogEntry, Project, ProjectId, Settings, SettingsPatch, TaskId,
};

use crate::config::ClientConfig;

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("API returned status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

impl From<ApiClientError> for FetchError {
    fn from(err: ApiClientError) -> Self {
        match err {
            ApiClientError::Http(e) if e.is_timeout() => FetchError::Timeout { elapsed_ms: 0 },
            ApiClientError::Http(e) => match e.status() {
                Some(status) => FetchError::Status {
                    status: status.as_u16(),
                    reason: e.to_string(),
                },
                None => FetchError::Transport {
                    reason: e.to_string(),
                },
            },
            ApiClientError::Serde(e) => FetchError::Codec {
                reason: e.to_string(),
            },
            ApiClientError::Api { status, message } => FetchError::Status {
                status,
                reason: message,
            },
            ApiClientError::InvalidResponse(reason) => FetchError::Codec { reason },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateDailyTaskRequest<'a> {
    title: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToggleDailyTaskRequest {
    is_completed: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateLogRequest<'a> {
    project_id: ProjectId,
    message: &'a str,
}

/// Typed HTTP client over the dashboard's REST endpoints.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
}

impl RestClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiClientError> {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ------------------------------------------------------------------------
    // Daily task endpoints
    // ------------------------------------------------------------------------

    pub async fn list_daily_tasks(&self) -> Result<Vec<DailyTask>, ApiClientError> {
        self.get_json("/api/v1/daily-tasks").await
    }

    pub async fn create_daily_task(&self, title: &str) -> Result<DailyTask, ApiClientError> {
        self.post_json("/api/v1/daily-tasks", &CreateDailyTaskRequest { title })
            .await
    }

    pub async fn toggle_daily_task(
        &self,
        id: TaskId,
        is_completed: bool,
    ) -> Result<DailyTask, ApiClientError> {
        let path = format!("/api/v1/daily-tasks/{id}");
        self.patch_json(&path, &ToggleDailyTaskRequest { is_completed })
            .await
    }

    pub async fn delete_daily_task(&self, id: TaskId) -> Result<(), ApiClientError> {
        let url = format!("{}/api/v1/daily-tasks/{id}", self.base_url);
        let response = self.client.delete(url).send().await?;
        self.expect_no_content(response).await
    }

    // ------------------------------------------------------------------------
    // Project / log endpoints
    // ------------------------------------------------------------------------

    pub async fn list_projects(&self) -> Result<Vec<Project>, ApiClientError> {
        self.get_json("/api/v1/projects").await
    }

    pub async fn create_log(
        &self,
        project_id: ProjectId,
        message: &str,
    ) -> Result<LogEntry, ApiClientError> {
        self.post_json(
            "/api/v1/logs",
            &CreateLogRequest {
                project_id,
                message,
            },
        )
        .await
    }

    // ------------------------------------------------------------------------
    // Settings endpoints
    // ------------------------------------------------------------------------

    pub async fn get_settings(&self) -> Result<Settings, ApiClientError> {
        self.get_json("/api/v1/settings").await
    }

    /// PATCH a partial settings object; absent fields are left unchanged by
    /// the backend. Returns the resulting settings.
    pub async fn update_settings(&self, patch: &SettingsPatch) -> Result<Settings, ApiClientError> {
        self.patch_json("/api/v1/settings", patch).await
    }

    // ------------------------------------------------------------------------
    // JSON helpers
    // ------------------------------------------------------------------------

    async fn get_json<T>(&self, path: &str) -> Result<T, ApiClientError>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        self.parse_response(response).await
    }

    async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T, ApiClientError>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "POST");
        let response = self.client.post(url).json(body).send().await?;
        self.parse_response(response).await
    }

    async fn patch_json<T, B>(&self, path: &str, body: &B) -> Result<T, ApiClientError>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "PATCH");
        let response = self.client.patch(url).json(body).send().await?;
        self.parse_response(response).await
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json::<T>().await?)
        } else {
            let text = response.text().await?;
            Err(ApiClientError::Api {
                status: status.as_u16(),
                message: text,
            })
        }
    }

    async fn expect_no_content(&self, response: reqwest::Response) -> Result<(), ApiClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let text = response.text().await?;
            Err(ApiClientError::Api {
                status: status.as_u16(),
                message: text,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ClientConfig {
        ClientConfig {
            api_base_url: "http://localhost:8080/".to_string(),
            request_timeout_ms: 5_000,
            refresh_interval_ms: 2_000,
            persistence_path: "tmp/opsdeck-ui.json".into(),
        }
    }

    #[test]
    fn test_base_url_is_trimmed() {
        let client = RestClient::new(&config()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_api_error_maps_to_status_fetch_error() {
        let err = ApiClientError::Api {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(
            FetchError::from(err),
            FetchError::Status {
                status: 502,
                reason: "bad gateway".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_response_maps_to_codec_error() {
        let err = ApiClientError::InvalidResponse("truncated body".to_string());
        assert!(matches!(FetchError::from(err), FetchError::Codec { .. }));
    }

    #[test]
    fn test_toggle_request_wire_shape() {
        let value =
            serde_json::to_value(ToggleDailyTaskRequest { is_completed: true }).unwrap();
        assert_eq!(value, serde_json::json!({ "isCompleted": true }));
    }
}
