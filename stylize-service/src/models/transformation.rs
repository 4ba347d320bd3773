use mongodb::bson::DateTime as BsonDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Image,
    Video,
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobKind::Image => write!(f, "image"),
            JobKind::Video => write!(f, "video"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformationStatus {
    Pending,
    Completed,
    Failed,
}

impl std::fmt::Display for TransformationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransformationStatus::Pending => write!(f, "pending"),
            TransformationStatus::Completed => write!(f, "completed"),
            TransformationStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A document from the `transformations` collection, keyed by the provider task id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transformation {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub task_id: String,
    #[serde(rename = "type")]
    pub kind: JobKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    pub prompt: String,
    #[serde(default)]
    pub original_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    pub status: TransformationStatus,
    #[serde(default)]
    pub subscription_type_at_creation: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub result_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Set by the database on write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<BsonDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<BsonDateTime>,
}

/// Final state of a provider task as reported by its callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Succeeded { result_urls: Vec<String> },
    Failed { message: String },
}

impl TaskOutcome {
    pub fn status(&self) -> TransformationStatus {
        match self {
            TaskOutcome::Succeeded { .. } => TransformationStatus::Completed,
            TaskOutcome::Failed { .. } => TransformationStatus::Failed,
        }
    }
}
