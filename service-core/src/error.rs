use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{error}: {message}")]
    Forbidden { error: String, message: String },

    #[error("Method not allowed")]
    MethodNotAllowed,

    /// A collaborator answered but rejected the call; surfaced as a 500.
    #[error("{error}: {}", .details.as_deref().unwrap_or("-"))]
    UpstreamError {
        error: String,
        details: Option<String>,
    },

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Database error: {0}")]
    DatabaseError(anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(anyhow::Error::new(err))
    }
}

/// JSON body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::UpstreamError { .. }
            | AppError::InternalError(_)
            | AppError::DatabaseError(_)
            | AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn into_body(self) -> ErrorResponse {
        let (error, message, details) = match self {
            AppError::BadRequest(msg) => (msg, None, None),
            AppError::NotFound(msg) => (msg, None, None),
            AppError::Forbidden { error, message } => (error, Some(message), None),
            AppError::MethodNotAllowed => ("Method not allowed".to_string(), None, None),
            AppError::UpstreamError { error, details } => (error, None, details),
            AppError::InternalError(err) => (err.to_string(), None, None),
            AppError::DatabaseError(err) => (err.to_string(), None, None),
            AppError::ConfigError(err) => (
                "Configuration error".to_string(),
                None,
                Some(err.to_string()),
            ),
        };

        ErrorResponse {
            success: false,
            error,
            message,
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "Request failed");
        } else {
            tracing::debug!(status = %status, error = %self, "Request rejected");
        }

        (status, Json(self.into_body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn forbidden_carries_message() {
        let (status, body) = render(AppError::Forbidden {
            error: "Quota exceeded".to_string(),
            message: "You have reached your weekly limit.".to_string(),
        })
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Quota exceeded");
        assert_eq!(body["message"], "You have reached your weekly limit.");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn upstream_error_is_internal_with_details() {
        let (status, body) = render(AppError::UpstreamError {
            error: "KIE.AI API error".to_string(),
            details: Some("insufficient credits".to_string()),
        })
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "KIE.AI API error");
        assert_eq!(body["details"], "insufficient credits");
    }

    #[tokio::test]
    async fn internal_error_exposes_message() {
        let (status, body) = render(AppError::InternalError(anyhow::anyhow!("connection reset"))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "connection reset");
    }

    #[tokio::test]
    async fn database_error_exposes_message() {
        let (status, body) =
            render(AppError::DatabaseError(anyhow::anyhow!("server selection timeout"))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "server selection timeout");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn method_not_allowed_body() {
        let (status, body) = render(AppError::MethodNotAllowed).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], "Method not allowed");
    }
}
