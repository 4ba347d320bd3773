use super::{ImageHost, ImagePayload, UploadError};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use service_core::observability::TracedClientExt;

/// Catbox answers with the file URL as plain text.
const CATBOX_FILES_PREFIX: &str = "https://files.catbox.moe/";

/// Anonymous uploads to catbox.moe; no API key.
pub struct CatboxHost {
    api_url: String,
    client: Client,
}

impl CatboxHost {
    pub fn new(api_url: String) -> Self {
        Self {
            api_url,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl ImageHost for CatboxHost {
    async fn upload(&self, image: &ImagePayload) -> Result<String, UploadError> {
        let file_name = format!("image-{}.png", chrono::Utc::now().timestamp_millis());
        let part = Part::bytes(image.bytes().to_vec())
            .file_name(file_name)
            .mime_str("image/png")
            .map_err(|e| UploadError::InvalidPayload(e.to_string()))?;

        let form = Form::new()
            .text("reqtype", "fileupload")
            .part("fileToUpload", part);

        let response = self
            .client
            .traced_post(&self.api_url)
            .map(|request| request.multipart(form))
            .send()
            .await
            .map_err(|e| UploadError::Network(format!("Failed to reach Catbox: {}", e)))?;

        let body = response
            .text()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        let url = body.trim();
        if url.starts_with(CATBOX_FILES_PREFIX) {
            tracing::info!(url = %url, bytes = image.len(), "Image uploaded to Catbox");
            Ok(url.to_string())
        } else {
            tracing::error!(body = %body, "Catbox upload failed");
            Err(UploadError::Rejected {
                host: self.name(),
                details: body,
            })
        }
    }

    fn name(&self) -> &'static str {
        "Catbox"
    }
}
