//! Generative-AI task providers.
//!
//! A provider accepts a model name, a callback URL and a model-specific input and answers
//! with the id of an asynchronous task. Results arrive later through the callback.

pub mod kie;

use async_trait::async_trait;
use serde::Serialize;
use service_core::error::AppError;
use thiserror::Error;

pub use kie::KieProvider;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    /// The provider answered with a non-success code.
    #[error("{provider} API error: {}", .message.as_deref().unwrap_or("unknown"))]
    ApiError {
        provider: &'static str,
        message: Option<String>,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::ApiError { provider, message } => AppError::UpstreamError {
                error: format!("{} API error", provider),
                details: message,
            },
            other => AppError::InternalError(anyhow::anyhow!(other.to_string())),
        }
    }
}

/// Model-specific task input, serialized as a plain JSON object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TaskInput {
    Pro {
        prompt: String,
        aspect_ratio: String,
        resolution: String,
        output_format: String,
    },
    Edit {
        prompt: String,
        image_urls: Vec<String>,
        output_format: String,
        image_size: String,
    },
    Generate {
        prompt: String,
        output_format: String,
        image_size: String,
    },
    Video {
        prompt: String,
        image_url: String,
        duration: String,
        resolution: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        enable_prompt_expansion: Option<bool>,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub model: String,
    #[serde(rename = "callBackUrl")]
    pub callback_url: String,
    pub input: TaskInput,
}

#[async_trait]
pub trait TaskProvider: Send + Sync {
    /// Submit a task and return the provider's task id.
    async fn create_task(&self, request: &CreateTaskRequest) -> Result<String, ProviderError>;

    fn name(&self) -> &'static str;
}
