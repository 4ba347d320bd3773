use super::{CreateTaskRequest, ProviderError, TaskProvider};
use crate::config::KieConfig;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use service_core::observability::TracedClientExt;

const CREATE_TASK_PATH: &str = "/api/v1/jobs/createTask";

/// KIE.AI jobs API client.
pub struct KieProvider {
    config: KieConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct KieResponse {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Option<KieTaskData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KieTaskData {
    task_id: String,
}

impl KieProvider {
    pub fn new(config: KieConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.config.api_key.expose_secret().is_empty()
    }

    fn create_task_url(&self) -> String {
        format!(
            "{}{}",
            self.config.api_base_url.trim_end_matches('/'),
            CREATE_TASK_PATH
        )
    }
}

#[async_trait]
impl TaskProvider for KieProvider {
    async fn create_task(&self, request: &CreateTaskRequest) -> Result<String, ProviderError> {
        if !self.is_configured() {
            return Err(ProviderError::NotConfigured(
                "KIE_API_KEY is not set".to_string(),
            ));
        }

        let response = self
            .client
            .traced_post(&self.create_task_url())
            .bearer_auth(self.config.api_key.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(format!("Failed to reach KIE.AI: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        tracing::debug!(status = %status, body = %body, "KIE.AI createTask response");

        // The API reports failures in the body `code`, whatever the HTTP status.
        let result: KieResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::InvalidResponse(format!(
                "KIE.AI returned unreadable body (HTTP {}): {}",
                status, e
            ))
        })?;

        if result.code != 200 {
            tracing::error!(
                code = result.code,
                msg = ?result.msg,
                model = %request.model,
                "KIE.AI rejected task"
            );
            return Err(ProviderError::ApiError {
                provider: self.name(),
                message: result.msg,
            });
        }

        let task_id = result
            .data
            .map(|data| data.task_id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                ProviderError::InvalidResponse("KIE.AI response has no taskId".to_string())
            })?;

        tracing::info!(task_id = %task_id, model = %request.model, "KIE.AI task created");

        Ok(task_id)
    }

    fn name(&self) -> &'static str {
        "KIE.AI"
    }
}
