//! HTTP handlers for stylize-service.

pub mod callback;
pub mod generate;
pub mod health;
pub mod upload;

use service_core::error::AppError;

pub use callback::kie_callback;
pub use generate::generate_image;
pub use health::{health_check, metrics_endpoint, readiness_check};
pub use upload::upload_image;

/// Fallback for known paths hit with the wrong method.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
