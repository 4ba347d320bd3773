use crate::models::JobKind;
use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /api/generate-image`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub user_id: Option<String>,
    pub style: Option<String>,
    pub custom_prompt: Option<String>,
    pub image_url: Option<String>,
    pub image_urls: Option<Vec<String>>,
    pub mode: Option<String>,
    #[serde(rename = "image_size")]
    pub image_size: Option<String>,
    pub is_pro: Option<bool>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub duration: Option<String>,
    pub resolution: Option<String>,
}

impl GenerateRequest {
    /// Image references in submission order: `imageUrls` when given, else `imageUrl`.
    pub fn image_references(&self) -> Vec<String> {
        let urls: Vec<String> = self
            .image_urls
            .iter()
            .flatten()
            .filter(|url| !url.is_empty())
            .cloned()
            .collect();

        if !urls.is_empty() {
            return urls;
        }

        super::present(&self.image_url)
            .map(|url| vec![url.to_string()])
            .unwrap_or_default()
    }

    /// The image a single-image job works from: `imageUrl`, else the first of `imageUrls`.
    pub fn primary_image(&self) -> Option<String> {
        super::present(&self.image_url)
            .map(str::to_string)
            .or_else(|| {
                self.image_urls
                    .iter()
                    .flatten()
                    .find(|url| !url.is_empty())
                    .cloned()
            })
    }
}

/// Clients send `duration` either as `"5"` or `5`.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or number, got {}",
            other
        ))),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub success: bool,
    pub task_id: String,
    pub message: String,
    pub estimated_time: String,
}

impl GenerateResponse {
    pub fn started(task_id: String, kind: JobKind) -> Self {
        let (message, estimated_time) = match kind {
            JobKind::Image => (
                "Transformation started! Results will be available soon.",
                "10-15 seconds",
            ),
            JobKind::Video => (
                "Video generation started! This may take 30-60 seconds.",
                "30-60 seconds",
            ),
        };

        Self {
            success: true,
            task_id,
            message: message.to_string(),
            estimated_time: estimated_time.to_string(),
        }
    }
}
