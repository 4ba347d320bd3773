use super::{ImageHost, ImagePayload, UploadError};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use service_core::observability::TracedClientExt;

const UPLOAD_PATH: &str = "/1/upload";

/// ImgBB uploads, authenticated with an API key.
pub struct ImgbbHost {
    api_url: String,
    api_key: Secret<String>,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct ImgbbResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<ImgbbImage>,
    #[serde(default)]
    error: Option<ImgbbError>,
}

#[derive(Debug, Deserialize)]
struct ImgbbImage {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ImgbbError {
    message: String,
}

impl ImgbbHost {
    pub fn new(api_url: String, api_key: Secret<String>) -> Self {
        Self {
            api_url,
            api_key,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl ImageHost for ImgbbHost {
    async fn upload(&self, image: &ImagePayload) -> Result<String, UploadError> {
        if self.api_key.expose_secret().is_empty() {
            return Err(UploadError::NotConfigured(
                "IMGBB_API_KEY is not set".to_string(),
            ));
        }

        let url = format!("{}{}", self.api_url.trim_end_matches('/'), UPLOAD_PATH);
        let response = self
            .client
            .traced_post(&url)
            .query(&[("key", self.api_key.expose_secret().as_str())])
            .form(&[("image", image.base64())])
            .send()
            .await
            .map_err(|e| UploadError::Network(format!("Failed to reach ImgBB: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        let parsed: Option<ImgbbResponse> = serde_json::from_str(&body).ok();
        match parsed {
            Some(ImgbbResponse {
                success: true,
                data: Some(ImgbbImage { url }),
                ..
            }) if status.is_success() => {
                tracing::info!(url = %url, bytes = image.len(), "Image uploaded to ImgBB");
                Ok(url)
            }
            other => {
                let details = other
                    .and_then(|r| r.error)
                    .map(|e| e.message)
                    .unwrap_or(body);
                tracing::error!(status = %status, details = %details, "ImgBB upload failed");
                Err(UploadError::Rejected {
                    host: self.name(),
                    details,
                })
            }
        }
    }

    fn name(&self) -> &'static str {
        "ImgBB"
    }
}
